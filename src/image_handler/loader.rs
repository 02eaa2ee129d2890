//! # 读取与写出模块
//!
//! ## 设计思路
//!
//! 在“尽可能早”的阶段执行输入校验：先看 metadata 体积，再读取全部字节。
//! 写出永远是单文件链路的最后一步，前面任何阶段失败都不会产生输出文件。
//!
//! 这里的 I/O 都是同步调用，由批处理放在 `spawn_blocking` 中执行。

use std::path::Path;

use super::source::RawImageData;
use super::{ImageConfig, ImageError, ImageHandler};

impl ImageHandler {
    /// 从本地路径加载图片原始字节。
    pub(super) fn load_from_file(
        &self,
        path: &Path,
        config: &ImageConfig,
    ) -> Result<RawImageData, ImageError> {
        log::debug!("📁 开始读取本地图片 - 路径: {}", path.display());

        let metadata = std::fs::metadata(path)
            .map_err(|e| ImageError::FileSystem(format!("无法读取文件信息 '{}'：{}", path.display(), e)))?;

        if !metadata.is_file() {
            return Err(ImageError::FileSystem(format!("不是普通文件：{}", path.display())));
        }

        if metadata.len() > config.max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| ImageError::FileSystem(format!("无法读取图片文件 '{}'：{}", path.display(), e)))?;

        Ok(RawImageData {
            bytes,
            source_hint: path.display().to_string(),
        })
    }

    /// 将编码结果写入目标路径。
    pub(super) fn write_output(&self, path: &Path, bytes: &[u8]) -> Result<(), ImageError> {
        std::fs::write(path, bytes)
            .map_err(|e| ImageError::FileSystem(format!("无法写入输出文件 '{}'：{}", path.display(), e)))?;

        log::debug!("💾 已写入 {} bytes - {}", bytes.len(), path.display());
        Ok(())
    }
}
