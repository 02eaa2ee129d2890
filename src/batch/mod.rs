//! # 批处理模块
//!
//! - `job`：根据输入目录生成 (输入, 输出) 任务计划
//! - `converter`：有界并发执行任务，支持协作式取消
//! - `report`：逐文件结果与汇总

mod converter;
mod job;
mod report;

pub use converter::{BatchConverter, CancelFlag};
pub use job::{BatchJob, JobPair};
pub use report::{ConversionOutcome, ConversionReport, OutcomeStatus};
