//! # 解码与变换流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 像素 → 灰度 → 字节”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低异常输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 读取 PNG header 尺寸
//! 2. 按像素上限与内存上限快速拒绝
//! 3. 完整解码为 RGBA
//! 4. 灰度变换
//! 5. 按配置压缩级别编码

use super::source::{PixelBuffer, RawImageData};
use super::{ImageConfig, ImageError, ImageHandler, codec, transform};

impl ImageHandler {
    /// 解码原始字节并完成灰度化，返回待编码的像素缓冲。
    pub(crate) fn decode_and_transform(
        &self,
        raw: &RawImageData,
        config: &ImageConfig,
    ) -> Result<PixelBuffer, ImageError> {
        let (header_width, header_height) = codec::inspect_dimensions(&raw.bytes)?;
        self.validate_pixel_limits(config, header_width, header_height)?;
        self.validate_decoded_memory_limits(config, header_width, header_height)?;

        let mut buffer = codec::decode(&raw.bytes)?;
        transform::to_grayscale_in_place(&mut buffer);

        log::debug!(
            "🎨 灰度化完成 - 来源: {} 尺寸: {}x{}",
            raw.source_hint,
            buffer.width(),
            buffer.height()
        );

        Ok(buffer)
    }

    /// 按配置压缩级别编码。
    pub(crate) fn encode_output(
        &self,
        buffer: &PixelBuffer,
        config: &ImageConfig,
    ) -> Result<Vec<u8>, ImageError> {
        codec::encode(buffer, config.compression)
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(
        &self,
        config: &ImageConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        &self,
        config: &ImageConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}
