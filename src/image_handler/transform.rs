//! # 灰度变换
//!
//! 对每个像素取 `gray = round((r + g + b) / 3)`，写回 R、G、B，Alpha 保持不变。
//!
//! 取整用整数运算 `(r + g + b + 1) / 3` 实现。三数之和除以 3 的小数部分只可能是
//! 0、1/3、2/3，不存在 .5 的平局，因此结果与“四舍五入”及其他就近取整方式完全一致。

use super::source::{CHANNELS, PixelBuffer};

/// 三通道平均亮度（就近取整）。
///
/// # 示例
/// ```rust
/// use grayscale_batch::image_handler::average_luma;
///
/// assert_eq!(average_luma(10, 20, 30), 20);
/// assert_eq!(average_luma(0, 0, 1), 0);
/// assert_eq!(average_luma(0, 1, 1), 1);
/// ```
#[inline]
pub fn average_luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = u16::from(r) + u16::from(g) + u16::from(b);
    // 最大 (765 + 1) / 3 = 255
    ((sum + 1) / 3) as u8
}

/// 返回新的灰度缓冲，原缓冲不变。
pub fn to_grayscale(buffer: &PixelBuffer) -> PixelBuffer {
    let mut out = buffer.clone();
    to_grayscale_in_place(&mut out);
    out
}

/// 原地灰度化。
pub fn to_grayscale_in_place(buffer: &mut PixelBuffer) {
    for px in buffer.samples_mut().chunks_exact_mut(CHANNELS) {
        let gray = average_luma(px[0], px[1], px[2]);
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
    }
}
