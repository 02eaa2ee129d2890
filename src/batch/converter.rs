//! # 批量转换器
//!
//! ## 设计思路
//!
//! 每个文件的转换互相独立，由 `Semaphore` 控制同时进行的数量，
//! 避免大批量时同时打开过多文件句柄。
//!
//! ## 实现思路
//!
//! 1. 创建输出目录、列举输入目录（失败即整批终止）
//! 2. 生成 `BatchJob`
//! 3. 依次申请许可 → `spawn_blocking` 执行单文件链路
//! 4. 按任务 id 收集结果，单文件失败只记录不终止；任务本身异常退出也记为失败
//!
//! 取消是协作式的：已开始的文件会正常完成，尚未开始的文件记为 `Cancelled`。

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};

use super::job::BatchJob;
use super::report::{ConversionOutcome, ConversionReport, OutcomeStatus};
use crate::error::AppError;
use crate::image_handler::{ImageConfig, ImageError, ImageHandler};
use crate::storage;

/// 单个转换任务的返回值：输入路径与转换结果。
type TaskOutput = (PathBuf, Result<PathBuf, ImageError>);

/// 协作式取消标志，可克隆后交给信号处理等其他任务。
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 同时执行中的转换数及其峰值。
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// 批量灰度转换器。
pub struct BatchConverter {
    handler: Arc<ImageHandler>,
    cancel: CancelFlag,
}

impl BatchConverter {
    /// 使用给定配置创建转换器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use grayscale_batch::batch::BatchConverter;
    /// use grayscale_batch::image_handler::ImageConfig;
    /// use std::path::Path;
    ///
    /// # async fn demo() -> Result<(), grayscale_batch::error::AppError> {
    /// let converter = BatchConverter::new(ImageConfig::default());
    /// let report = converter.convert(Path::new("unzipped"), Path::new("grayscaled")).await?;
    /// println!("{report}");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: ImageConfig) -> Self {
        Self {
            handler: Arc::new(ImageHandler::new(config)),
            cancel: CancelFlag::new(),
        }
    }

    /// 返回与本转换器共享的取消标志。
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// 转换 `input_dir` 下所有匹配的图片，写入 `output_dir`。
    ///
    /// 仅在输出目录无法创建或输入目录无法列举时返回错误。
    pub async fn convert(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<ConversionReport, AppError> {
        let config = self.handler.config();

        storage::ensure_dir(output_dir).await?;
        let inputs = storage::list_images(input_dir, &config.extension).await?;
        let job = BatchJob::plan(inputs, output_dir);

        log::info!(
            "📦 发现 {} 个待转换文件 - 输入: {} 输出: {} 并发: {}",
            job.len(),
            input_dir.display(),
            output_dir.display(),
            config.concurrency.max(1)
        );

        let report = self.run(job, config.concurrency).await;

        log::info!(
            "🏁 批处理结束 - 成功 {} 失败 {} 取消 {} 峰值并发 {} 耗时 {}ms",
            report.succeeded(),
            report.failed(),
            report.cancelled(),
            report.peak_in_flight,
            report.elapsed_ms
        );

        Ok(report)
    }

    /// 以给定并发度执行任务计划，每个输入在报告中恰好出现一次。
    pub async fn run(&self, job: BatchJob, concurrency: usize) -> ConversionReport {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let in_flight = Arc::new(InFlight::default());
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let mut pending: HashMap<task::Id, PathBuf> = HashMap::with_capacity(job.len());
        let mut outcomes = Vec::with_capacity(job.len());

        for pair in job.into_pairs() {
            if self.cancel.is_cancelled() {
                outcomes.push(cancelled(pair.input));
                continue;
            }

            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    outcomes.push(cancelled(pair.input));
                    continue;
                }
            };

            // 等待许可期间可能已收到取消信号
            if self.cancel.is_cancelled() {
                drop(permit);
                outcomes.push(cancelled(pair.input));
                continue;
            }

            let handler = Arc::clone(&self.handler);
            let in_flight = Arc::clone(&in_flight);
            let input = pair.input.clone();
            let handle = tasks.spawn_blocking(move || {
                let _permit = permit;
                in_flight.enter();
                let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    handler.convert_file(&pair.input, &pair.output)
                }))
                .unwrap_or_else(|_| {
                    log::error!("❌ 处理 {} 时发生 panic", pair.input.display());
                    Err(ImageError::Encode("内部处理异常".to_string()))
                });
                in_flight.leave();
                (pair.input, result)
            });
            pending.insert(handle.id(), input);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            if let Some(outcome) = outcome_from_join(joined, &mut pending) {
                outcomes.push(outcome);
            }
        }

        ConversionReport::new(outcomes, start.elapsed().as_millis(), in_flight.peak())
    }
}

/// 将一个已结束任务转换为结果；任务异常退出时按 id 找回其输入并记为失败。
fn outcome_from_join(
    joined: Result<(task::Id, TaskOutput), JoinError>,
    pending: &mut HashMap<task::Id, PathBuf>,
) -> Option<ConversionOutcome> {
    match joined {
        Ok((id, (input, Ok(output)))) => {
            pending.remove(&id);
            Some(ConversionOutcome {
                input,
                status: OutcomeStatus::Written { output },
            })
        }
        Ok((id, (input, Err(error)))) => {
            pending.remove(&id);
            log::warn!("⚠️ 转换失败 - {}: {}", input.display(), error);
            Some(ConversionOutcome {
                input,
                status: OutcomeStatus::Failed { error },
            })
        }
        Err(err) => {
            let Some(input) = pending.remove(&err.id()) else {
                log::error!("❌ 未知转换任务异常退出: {}", err);
                return None;
            };
            log::error!("❌ 转换任务异常退出 - {}: {}", input.display(), err);
            Some(ConversionOutcome {
                input,
                status: OutcomeStatus::Failed {
                    error: ImageError::Encode(format!("转换任务异常退出：{}", err)),
                },
            })
        }
    }
}

fn cancelled(input: PathBuf) -> ConversionOutcome {
    log::debug!("⊘ 已取消，跳过: {}", input.display());
    ConversionOutcome {
        input,
        status: OutcomeStatus::Cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::{PixelBuffer, codec};
    use image::codecs::png::CompressionType;
    use std::collections::BTreeMap;

    fn write_png(path: &Path, width: u32, height: u32, seed: u8) {
        let samples = (0..width * height * 4)
            .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
            .collect();
        let buffer = PixelBuffer::from_raw(width, height, samples).expect("buffer");
        std::fs::write(path, codec::encode(&buffer, CompressionType::Fast).expect("encode"))
            .expect("write png");
    }

    fn config_with(concurrency: usize) -> ImageConfig {
        let mut config = ImageConfig::default();
        config.concurrency = concurrency;
        config
    }

    fn summarize(report: &ConversionReport) -> BTreeMap<String, String> {
        report
            .outcomes
            .iter()
            .map(|o| {
                let name = o.input.file_name().unwrap().to_string_lossy().to_string();
                let status = match &o.status {
                    OutcomeStatus::Written { output } => {
                        format!("written:{}", output.file_name().unwrap().to_string_lossy())
                    }
                    OutcomeStatus::Failed { error } => format!("failed:{}", error.code()),
                    OutcomeStatus::Cancelled => "cancelled".to_string(),
                };
                (name, status)
            })
            .collect()
    }

    #[tokio::test]
    async fn mixed_directory_reports_each_png_once() {
        let input = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");
        let out_dir = output.path().join("gray");

        write_png(&input.path().join("a.png"), 3, 2, 5);
        std::fs::write(input.path().join("b.png"), b"corrupt bytes").expect("write");
        std::fs::write(input.path().join("notes.txt"), b"ignore me").expect("write");

        let converter = BatchConverter::new(config_with(2));
        let report = converter.convert(input.path(), &out_dir).await.expect("convert");

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(report.outcome_for("notes.txt").is_none());

        let a = report.outcome_for("a.png").expect("a.png outcome");
        match &a.status {
            OutcomeStatus::Written { output } => assert_eq!(output, &out_dir.join("a.png")),
            other => panic!("unexpected status: {other:?}"),
        }

        let b = report.outcome_for("b.png").expect("b.png outcome");
        assert!(matches!(
            b.status,
            OutcomeStatus::Failed {
                error: ImageError::Decode(_)
            }
        ));
        assert!(!out_dir.join("b.png").exists());

        let gray = codec::decode(&std::fs::read(out_dir.join("a.png")).expect("read")).expect("decode");
        for px in gray.samples().chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[tokio::test]
    async fn missing_input_dir_is_fatal() {
        let root = tempfile::tempdir().expect("tempdir");
        let converter = BatchConverter::new(ImageConfig::default());

        let result = converter
            .convert(&root.path().join("missing"), &root.path().join("out"))
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn uncreatable_output_dir_is_fatal() {
        let root = tempfile::tempdir().expect("tempdir");
        let blocker = root.path().join("file");
        std::fs::write(&blocker, b"x").expect("write");

        let converter = BatchConverter::new(ImageConfig::default());
        let result = converter.convert(root.path(), &blocker.join("out")).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn sequential_and_parallel_runs_agree() {
        let input = tempfile::tempdir().expect("tempdir");
        for i in 0..6u8 {
            write_png(&input.path().join(format!("img{i}.png")), 4 + u32::from(i), 3, i);
        }
        std::fs::write(input.path().join("broken.png"), b"\x89PNG\r\n\x1a\ntruncated").expect("write");

        let out_one = tempfile::tempdir().expect("tempdir");
        let out_many = tempfile::tempdir().expect("tempdir");

        let one = BatchConverter::new(config_with(1))
            .convert(input.path(), out_one.path())
            .await
            .expect("sequential");
        let many = BatchConverter::new(config_with(4))
            .convert(input.path(), out_many.path())
            .await
            .expect("parallel");

        assert_eq!(summarize(&one), summarize(&many));
        assert_eq!(one.succeeded(), 6);
        assert_eq!(one.failed(), 1);

        for i in 0..6 {
            let name = format!("img{i}.png");
            let a = std::fs::read(out_one.path().join(&name)).expect("read");
            let b = std::fs::read(out_many.path().join(&name)).expect("read");
            assert_eq!(a, b);
        }
    }

    #[tokio::test]
    async fn cancelled_before_start_writes_nothing() {
        let input = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");
        write_png(&input.path().join("a.png"), 2, 2, 1);
        write_png(&input.path().join("b.png"), 2, 2, 2);

        let converter = BatchConverter::new(ImageConfig::default());
        converter.cancel_flag().cancel();

        let report = converter.convert(input.path(), output.path()).await.expect("convert");

        assert_eq!(report.cancelled(), 2);
        assert_eq!(report.succeeded(), 0);
        assert!(!output.path().join("a.png").exists());
    }

    #[tokio::test]
    async fn empty_directory_produces_empty_report() {
        let input = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");

        let report = BatchConverter::new(ImageConfig::default())
            .convert(input.path(), output.path())
            .await
            .expect("convert");

        assert!(report.outcomes.is_empty());
    }

    fn png_count(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .expect("read_dir")
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "png"))
            .count()
    }

    #[tokio::test]
    async fn in_flight_conversions_never_exceed_concurrency() {
        let input = tempfile::tempdir().expect("tempdir");
        for i in 0..12u8 {
            write_png(&input.path().join(format!("img{i:02}.png")), 64, 64, i);
        }

        let out_three = tempfile::tempdir().expect("tempdir");
        let report = BatchConverter::new(config_with(3))
            .convert(input.path(), out_three.path())
            .await
            .expect("convert");
        assert_eq!(report.succeeded(), 12);
        assert!(report.peak_in_flight >= 1);
        assert!(report.peak_in_flight <= 3, "peak {}", report.peak_in_flight);

        let out_one = tempfile::tempdir().expect("tempdir");
        let report = BatchConverter::new(config_with(1))
            .convert(input.path(), out_one.path())
            .await
            .expect("convert");
        assert_eq!(report.succeeded(), 12);
        assert_eq!(report.peak_in_flight, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancel_mid_batch_accounts_for_every_file() {
        const TOTAL: usize = 40;
        let input = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");
        for i in 0..TOTAL {
            write_png(&input.path().join(format!("f{i:02}.png")), 192, 192, i as u8);
        }

        let converter = BatchConverter::new(config_with(1));
        let flag = converter.cancel_flag();
        let first = output.path().join("f00.png");
        let watcher = tokio::spawn(async move {
            while !first.exists() {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            }
            flag.cancel();
        });

        let report = converter.convert(input.path(), output.path()).await.expect("convert");
        watcher.await.expect("watcher");

        assert_eq!(report.outcomes.len(), TOTAL);
        assert_eq!(report.failed(), 0);
        assert!(report.succeeded() >= 1);
        assert!(report.cancelled() > 0);
        assert_eq!(report.succeeded() + report.cancelled(), TOTAL);
        assert_eq!(report.succeeded(), png_count(output.path()));

        for outcome in &report.outcomes {
            let name = outcome.input.file_name().expect("file name");
            let written = output.path().join(name).exists();
            assert_eq!(outcome.is_success(), written, "{}", outcome.input.display());
        }
    }

    #[tokio::test]
    async fn aborted_task_is_reported_as_failed() {
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let mut pending = HashMap::new();

        let handle = tasks.spawn(std::future::pending::<TaskOutput>());
        pending.insert(handle.id(), PathBuf::from("in/stuck.png"));
        handle.abort();

        let joined = tasks.join_next_with_id().await.expect("one task");
        assert!(joined.is_err());

        let outcome = outcome_from_join(joined, &mut pending).expect("outcome");
        assert_eq!(outcome.input, PathBuf::from("in/stuck.png"));
        assert!(matches!(
            outcome.status,
            OutcomeStatus::Failed {
                error: ImageError::Encode(_)
            }
        ));
        assert!(pending.is_empty());
    }
}
