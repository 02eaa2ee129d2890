//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，承载“整批致命”的错误：
//! 压缩包解压失败、输出目录无法创建、输入目录无法列举、配置非法。
//!
//! 单张图片的失败使用 `ImageError`，记录在批处理报告中，不会上升为 `AppError`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于 JSON 输出。

use serde::Serialize;

use crate::image_handler::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 压缩包损坏或无法读取
    #[error("解压失败: {0}")]
    Extract(String),

    /// 目录创建或列举失败（整批终止）
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 配置文件或参数非法
    #[error("配置错误: {0}")]
    Config(String),

    /// 图片处理流水线错误
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
