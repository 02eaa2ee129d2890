//! 配置文件模块
//!
//! 可选的 JSON 配置文件，字段均可省略，省略时沿用 `ImageConfig::default()`：
//!
//! ```json
//! {
//!   "max_file_size": 52428800,
//!   "max_decoded_pixels": 40000000,
//!   "max_decoded_bytes": 167772160,
//!   "concurrency": 8,
//!   "extension": ".png",
//!   "profile": "balanced"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::image_handler::{ImageConfig, ImagePerformanceProfile};

const MAX_CONCURRENCY: usize = 256;
const MIN_DECODED_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterSettings {
    pub max_file_size: Option<u64>,
    pub max_decoded_pixels: Option<u64>,
    pub max_decoded_bytes: Option<u64>,
    pub concurrency: Option<usize>,
    pub extension: Option<String>,
    pub profile: Option<String>,
}

/// 读取并解析配置文件。
pub fn load_settings(path: &Path) -> Result<ConverterSettings, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("读取配置文件 '{}' 失败: {}", path.display(), e)))?;

    serde_json::from_str::<ConverterSettings>(&content)
        .map_err(|e| AppError::Config(format!("解析配置文件失败: {}", e)))
}

impl ConverterSettings {
    /// 校验后覆盖到 `config` 上；任一字段非法时 `config` 保持不变。
    pub fn apply_to(&self, config: &mut ImageConfig) -> Result<(), AppError> {
        if let Some(size) = self.max_file_size {
            if size == 0 {
                return Err(AppError::Config("max_file_size 必须大于 0".to_string()));
            }
        }
        if let Some(pixels) = self.max_decoded_pixels {
            if pixels == 0 {
                return Err(AppError::Config("max_decoded_pixels 必须大于 0".to_string()));
            }
        }
        if let Some(bytes) = self.max_decoded_bytes {
            if bytes < MIN_DECODED_BYTES {
                return Err(AppError::Config("max_decoded_bytes 不能小于 8MB".to_string()));
            }
        }
        if let Some(concurrency) = self.concurrency {
            if !(1..=MAX_CONCURRENCY).contains(&concurrency) {
                return Err(AppError::Config(format!(
                    "concurrency 必须在 1~{} 之间",
                    MAX_CONCURRENCY
                )));
            }
        }
        if let Some(extension) = &self.extension {
            if extension.is_empty() {
                return Err(AppError::Config("extension 不能为空".to_string()));
            }
        }
        let profile = self
            .profile
            .as_deref()
            .map(ImagePerformanceProfile::from_str)
            .transpose()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if let Some(size) = self.max_file_size {
            config.max_file_size = size;
        }
        if let Some(pixels) = self.max_decoded_pixels {
            config.max_decoded_pixels = pixels;
        }
        if let Some(bytes) = self.max_decoded_bytes {
            config.max_decoded_bytes = bytes;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(extension) = &self.extension {
            config.extension = extension.clone();
        }
        if let Some(profile) = profile {
            config.apply_performance_profile(profile);
        }

        Ok(())
    }
}
