//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ImageConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中性能档位（quality / balanced / speed）作为高层语义，映射到底层 PNG 压缩级别。
//! 压缩级别只影响输出文件体积与耗时，像素数据始终无损。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `ImagePerformanceProfile` 负责档位字符串解析与反向输出。
//! - `apply_performance_profile` 将档位转换为具体压缩级别。
//! - `infer_performance_profile` 用于从当前配置反推档位（给日志与报告展示）。

use image::codecs::png::CompressionType;

use super::ImageError;

/// 默认识别的图片扩展名（大小写敏感）。
pub const DEFAULT_EXTENSION: &str = ".png";

/// 图片处理配置。
///
/// 字段覆盖了读取、解码、编码与批处理并发四个方面。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 同时处理的文件数上限（至少为 1）。
    pub concurrency: usize,
    /// 参与转换的文件名后缀。
    pub extension: String,
    /// PNG 编码压缩级别。
    pub compression: CompressionType,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            concurrency: default_concurrency(),
            extension: DEFAULT_EXTENSION.to_string(),
            compression: CompressionType::Default,
        }
    }
}

/// 默认并发度：可用 CPU 数，无法获取时回退为 4。
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// 图片性能档位（面向用户语义）。
///
/// - `Quality`：输出体积最小
/// - `Balanced`：体积与速度平衡
/// - `Speed`：优先编码速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl ImagePerformanceProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use grayscale_batch::image_handler::ImagePerformanceProfile;
    ///
    /// let p = ImagePerformanceProfile::from_str("balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), grayscale_batch::image_handler::ImageError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(profile: &str) -> Result<Self, ImageError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(ImageError::InvalidFormat(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl ImageConfig {
    /// 基于当前压缩级别反推性能档位。
    pub fn infer_performance_profile(&self) -> ImagePerformanceProfile {
        match self.compression {
            CompressionType::Best => ImagePerformanceProfile::Quality,
            CompressionType::Fast => ImagePerformanceProfile::Speed,
            _ => ImagePerformanceProfile::Balanced,
        }
    }

    /// 应用指定性能档位到实际参数。
    pub fn apply_performance_profile(&mut self, profile: ImagePerformanceProfile) {
        self.compression = match profile {
            ImagePerformanceProfile::Quality => CompressionType::Best,
            ImagePerformanceProfile::Balanced => CompressionType::Default,
            ImagePerformanceProfile::Speed => CompressionType::Fast,
        };
    }

    /// 文件名是否匹配配置的扩展名。
    pub fn matches_extension(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.extension)
    }
}
