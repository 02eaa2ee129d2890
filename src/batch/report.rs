//! 批处理报告
//!
//! 每个被发现的输入文件在报告中恰好出现一次，按输入路径排序。

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::image_handler::ImageError;

/// 单个文件的处理结果。
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// 已写出灰度图。
    Written { output: PathBuf },
    /// 处理失败，附带原因。
    Failed { error: ImageError },
    /// 收到取消信号时尚未开始。
    Cancelled,
}

#[derive(Debug, Serialize)]
pub struct ConversionOutcome {
    pub input: PathBuf,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Written { .. })
    }
}

/// 整批结果。
#[derive(Debug, Serialize)]
pub struct ConversionReport {
    pub outcomes: Vec<ConversionOutcome>,
    /// RFC 3339 完成时间。
    pub finished_at: String,
    pub elapsed_ms: u128,
    /// 同时执行中的转换数峰值，不超过配置的并发度。
    pub peak_in_flight: usize,
}

impl ConversionReport {
    pub(crate) fn new(
        mut outcomes: Vec<ConversionOutcome>,
        elapsed_ms: u128,
        peak_in_flight: usize,
    ) -> Self {
        outcomes.sort_by(|a, b| a.input.cmp(&b.input));
        Self {
            outcomes,
            finished_at: chrono::Local::now().to_rfc3339(),
            elapsed_ms,
            peak_in_flight,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
            .count()
    }

    pub fn cancelled(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Cancelled))
            .count()
    }

    /// 按输入路径（或文件名）查找结果。
    pub fn outcome_for(&self, name: &str) -> Option<&ConversionOutcome> {
        self.outcomes.iter().find(|o| {
            o.input.as_os_str() == name || o.input.file_name().is_some_and(|n| n == name)
        })
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.status {
                OutcomeStatus::Written { output } => {
                    writeln!(f, "✔ {} -> {}", outcome.input.display(), output.display())?
                }
                OutcomeStatus::Failed { error } => {
                    writeln!(f, "✘ {}: {}", outcome.input.display(), error)?
                }
                OutcomeStatus::Cancelled => writeln!(f, "⊘ {}: 已取消", outcome.input.display())?,
            }
        }
        write!(
            f,
            "共 {} 个文件：成功 {}，失败 {}，取消 {}（{}ms）",
            self.outcomes.len(),
            self.succeeded(),
            self.failed(),
            self.cancelled(),
            self.elapsed_ms
        )
    }
}
