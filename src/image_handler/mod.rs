//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“读取 → 资源校验 → 解码 → 灰度化 → 编码 → 写出”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `codec`：PNG 字节与 `PixelBuffer` 互转（`image` crate 薄封装）
//! - `transform`：纯函数灰度变换
//! - `handler`：编排单张图片的处理流水线
//! - `loader`：负责文件读取、体积校验与写出
//! - `pipeline`：负责尺寸/内存限制、解码、变换、编码
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 调用链
//!
//! ```text
//! batch::BatchConverter（并发调度）
//!    ↓
//! handler.rs（单文件编排 + 阶段耗时日志）
//!    ├─ loader.rs（读取 + 体积校验）
//!    ├─ pipeline.rs（限制校验 → codec::decode → transform）
//!    ├─ pipeline.rs（codec::encode）
//!    └─ loader.rs（写出）
//!    ↓
//! Result<PathBuf, ImageError>
//! ```

pub mod codec;
mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod source;
pub mod transform;

pub use config::{DEFAULT_EXTENSION, ImageConfig, ImagePerformanceProfile, default_concurrency};
pub use error::ImageError;
pub use handler::ImageHandler;
pub use source::{CHANNELS, PixelBuffer};
pub use transform::{average_luma, to_grayscale, to_grayscale_in_place};
