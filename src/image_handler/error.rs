//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载单张图片转换链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 这些错误都是“单文件级”的：批处理会把它们记录到对应文件的结果中，不会中断整批。

use serde::Serialize;

/// 图片处理统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl ImageError {
    /// 稳定的错误码，供 JSON 报告与脚本匹配。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_error",
            Self::Encode(_) => "encode_error",
            Self::InvalidFormat(_) => "invalid_format",
            Self::FileSystem(_) => "io_error",
            Self::ResourceLimit(_) => "resource_limit",
        }
    }

    /// 出错所在的处理阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::Encode(_) => "encode",
            Self::InvalidFormat(_) => "config",
            Self::FileSystem(_) => "io",
        }
    }
}

/// 报告序列化时输出 `{ code, stage, message }`。
impl Serialize for ImageError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ImageError", 3)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("stage", self.stage())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
