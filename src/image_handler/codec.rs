//! # PNG 编解码适配
//!
//! 在 `image` crate 之上的薄封装，只负责 PNG 字节与 [`PixelBuffer`] 之间的转换。
//!
//! - 解码：任何可读的 PNG 色彩类型 / 位深（灰度、调色板、16 位等）统一转为 RGBA8。
//! - 编码：固定 RGBA8 + Paeth 滤波，压缩级别由调用方给定，输出可重复。

use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::io::Cursor;

use super::ImageError;
use super::source::{PixelBuffer, expected_len};

/// 将 PNG 字节解码为 RGBA 像素缓冲。
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, ImageError> {
    validate_png_signature(bytes)?;

    let decoded = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Png)
        .decode()
        .map_err(|e| ImageError::Decode(format!("PNG 解码失败：{}", e)))?;

    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();

    PixelBuffer::from_raw(width, height, rgba.into_raw())
        .ok_or_else(|| ImageError::Decode(format!("解码后像素数据异常：{}x{}", width, height)))
}

/// 将 RGBA 像素缓冲编码为 PNG 字节。
pub fn encode(buffer: &PixelBuffer, compression: CompressionType) -> Result<Vec<u8>, ImageError> {
    let expected = expected_len(buffer.width(), buffer.height())
        .ok_or_else(|| ImageError::Encode("图片尺寸导致长度溢出".to_string()))?;
    if buffer.samples().len() != expected {
        return Err(ImageError::Encode(format!(
            "像素数据长度不符：{}（期望：{}）",
            buffer.samples().len(),
            expected
        )));
    }

    let mut out = Vec::with_capacity(expected / 2);
    let encoder = PngEncoder::new_with_quality(&mut out, compression, PngFilterType::Paeth);
    encoder
        .write_image(
            buffer.samples(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;

    Ok(out)
}

/// 仅通过 PNG 头读取宽高，用于完整解码前的资源检查。
pub(crate) fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    validate_png_signature(bytes)?;

    ImageReader::with_format(Cursor::new(bytes), ImageFormat::Png)
        .into_dimensions()
        .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
}

fn validate_png_signature(bytes: &[u8]) -> Result<(), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Decode("图片内容为空".to_string()));
    }
    if !infer::image::is_png(bytes) {
        let kind = infer::get(bytes)
            .map(|k| k.mime_type())
            .unwrap_or("unknown");
        return Err(ImageError::Decode(format!("文件签名不是 PNG：{}", kind)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgba};
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, (x * 7 % 256) as u8])
        });
        PixelBuffer::from_raw(width, height, img.into_raw()).expect("valid buffer")
    }

    #[test]
    fn round_trip_is_lossless() {
        let original = gradient(37, 19);
        let bytes = encode(&original, CompressionType::Default).expect("encode");
        assert!(infer::image::is_png(&bytes));

        let decoded = decode(&bytes).expect("decode");
        assert_eq!(decoded, original);
        assert_eq!(inspect_dimensions(&bytes).expect("dimensions"), (37, 19));
    }

    #[test]
    fn encoding_is_deterministic() {
        let original = gradient(16, 16);
        let first = encode(&original, CompressionType::Best).expect("encode");
        let second = encode(&original, CompressionType::Best).expect("encode");
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_bad_signature() {
        let result = decode(b"definitely not a png file");
        assert!(matches!(result, Err(ImageError::Decode(_))));

        assert!(matches!(decode(&[]), Err(ImageError::Decode(_))));
    }

    #[test]
    fn rejects_truncated_data() {
        let bytes = encode(&gradient(32, 32), CompressionType::Default).expect("encode");
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(decode(truncated), Err(ImageError::Decode(_))));
    }

    #[test]
    fn grayscale_png_is_expanded_to_rgba() {
        let gray: GrayImage = ImageBuffer::from_fn(4, 3, |x, _| Luma([(x * 50) as u8]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(gray)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("write gray png");

        let decoded = decode(cursor.get_ref()).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
        assert_eq!(decoded.pixel(2, 1), Some([100, 100, 100, 255]));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn decode_inverts_encode(
            (w, h, samples) in (1u32..9, 1u32..9).prop_flat_map(|(w, h)| {
                (Just(w), Just(h), proptest::collection::vec(any::<u8>(), (w * h * 4) as usize))
            })
        ) {
            let buffer = PixelBuffer::from_raw(w, h, samples).expect("valid buffer");
            let bytes = encode(&buffer, CompressionType::Fast).expect("encode");
            prop_assert_eq!(decode(&bytes).expect("decode"), buffer);
        }
    }
}
