//! # 数据模型
//!
//! ## 设计思路
//!
//! 将“磁盘字节”和“像素数据”解耦：
//! - `RawImageData` 表示已读取但未解码的字节
//! - `PixelBuffer` 表示解码后的 RGBA 像素，编码前的唯一数据形态

/// 每个像素的通道数（R、G、B、A）。
pub const CHANNELS: usize = 4;

/// 读取阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: String,
}

/// 解码后的 RGBA 像素缓冲。
///
/// 行优先、交错存储、无行填充：像素 `(x, y)` 的通道 `c` 位于
/// `(width * y + x) * 4 + c`。只能通过 [`PixelBuffer::from_raw`] 构造，
/// 因此宽高恒为正且长度恒等于 `width * height * 4`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// 由原始样本构造；宽高为 0 或长度不符时返回 `None`。
    ///
    /// # 示例
    /// ```rust
    /// use grayscale_batch::image_handler::PixelBuffer;
    ///
    /// let buffer = PixelBuffer::from_raw(1, 1, vec![10, 20, 30, 255]).unwrap();
    /// assert_eq!(buffer.pixel(0, 0), Some([10, 20, 30, 255]));
    /// assert_eq!(buffer.pixel(1, 0), None);
    /// assert!(PixelBuffer::from_raw(2, 1, vec![0; 4]).is_none());
    /// ```
    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let expected = expected_len(width, height)?;
        if samples.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 全部样本（只读）。
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// 像素 `(x, y)` 通道 `channel` 的偏移量。
    pub fn offset(&self, x: u32, y: u32, channel: usize) -> usize {
        (self.width as usize * y as usize + x as usize) * CHANNELS + channel
    }

    /// 读取像素 `(x, y)` 的 RGBA 值，越界时返回 `None`。
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x, y, 0);
        let px = self.samples.get(start..start + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// `width * height * 4`，溢出时返回 `None`。
pub(crate) fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
}
