//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责单张图片的流程编排与配置管理，不关心批处理与并发。
//! 处理链路固定为：
//! 1. 读取原始字节
//! 2. 解码并灰度化
//! 3. 编码
//! 4. 写出
//!
//! ## 实现思路
//!
//! - 配置在创建时固定，单次批处理内所有文件使用同一份参数。
//! - 记录 `load/decode/encode/write/total` 阶段耗时，便于性能诊断。

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{ImageConfig, ImageError};

/// 图片处理器。
///
/// 可在多个转换任务间共享（`Arc<ImageHandler>`），自身不持有任何像素数据。
pub struct ImageHandler {
    pub(super) config: ImageConfig,
}

impl ImageHandler {
    /// 根据配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use grayscale_batch::image_handler::{ImageConfig, ImageHandler};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default());
    /// assert_eq!(handler.config().extension, ".png");
    /// ```
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// 处理主入口：读取 `input`，灰度化后写入 `output`。
    ///
    /// 成功时返回写出的路径。任何阶段失败都不会写出文件。
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<PathBuf, ImageError> {
        let config = &self.config;
        let total_start = Instant::now();

        log::info!("🖼️ 开始处理: {}，输出: {}", input.display(), output.display());

        let load_start = Instant::now();
        let raw = self.load_from_file(input, config)?;
        let load_elapsed = load_start.elapsed();

        let decode_start = Instant::now();
        let buffer = self.decode_and_transform(&raw, config)?;
        let decode_elapsed = decode_start.elapsed();
        drop(raw);

        let encode_start = Instant::now();
        let encoded = self.encode_output(&buffer, config).inspect_err(|err| {
            log::error!("❌ 编码阶段出现内部错误（不应发生）- {}: {}", input.display(), err);
        })?;
        let encode_elapsed = encode_start.elapsed();
        drop(buffer);

        let write_start = Instant::now();
        self.write_output(output, &encoded)?;
        let write_elapsed = write_start.elapsed();

        log::info!(
            "✅ 图片处理完成 - {} load={}ms decode={}ms encode={}ms write={}ms total={}ms",
            input.display(),
            load_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            write_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(output.to_path_buf())
    }
}
