//! # 批量灰度转换工具 — 命令行入口
//!
//! 本文件仅负责日志初始化、参数解析与流程串联。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use grayscale_batch::archive::{self, ExtractSummary};
use grayscale_batch::batch::{BatchConverter, ConversionReport};
use grayscale_batch::error::AppError;
use grayscale_batch::image_handler::{ImageConfig, ImagePerformanceProfile};
use grayscale_batch::settings::{self, ConverterSettings};
use grayscale_batch::storage;

/// 解压 zip 压缩包，并将其中的 PNG 图片批量转换为灰度图。
#[derive(Debug, Parser)]
#[command(name = "grayscale-batch", version)]
struct Cli {
    /// zip 压缩包路径
    archive: PathBuf,

    /// 解压目录
    #[arg(long, default_value = "unzipped")]
    extract_dir: PathBuf,

    /// 灰度图输出目录
    #[arg(long, default_value = "grayscaled")]
    output_dir: PathBuf,

    /// 同时处理的文件数（默认：CPU 数）
    #[arg(long)]
    concurrency: Option<usize>,

    /// 性能档位：quality / balanced / speed
    #[arg(long, value_parser = ImagePerformanceProfile::from_str)]
    profile: Option<ImagePerformanceProfile>,

    /// JSON 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 以 JSON 输出报告
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    extract: &'a ExtractSummary,
    report: &'a ConversionReport,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ 运行失败: {err}");
            eprintln!("错误: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = build_config(&cli)?;

    let archive_path = cli.archive.clone();
    let extract_dir = cli.extract_dir.clone();
    let extracted = tokio::task::spawn_blocking(move || archive::extract(&archive_path, &extract_dir))
        .await
        .map_err(|e| AppError::Extract(format!("解压任务异常退出: {e}")))??;

    let converter = BatchConverter::new(config);
    let cancel = converter.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("⏹️ 收到中断信号，等待进行中的文件完成后停止");
            cancel.cancel();
        }
    });

    let report = converter.convert(&cli.extract_dir, &cli.output_dir).await?;

    if cli.json {
        let summary = RunSummary {
            extract: &extracted,
            report: &report,
        };
        let text = serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?;
        println!("{text}");
    } else {
        println!("{report}");
        let info = storage::dir_info(&cli.output_dir).await?;
        println!(
            "输出目录 {}：{} 个文件，共 {:.2} KB",
            info.path,
            info.file_count,
            info.total_size as f64 / 1024.0
        );
    }

    Ok(())
}

/// 默认配置 → 配置文件 → 命令行参数，逐层覆盖。
fn build_config(cli: &Cli) -> Result<ImageConfig, AppError> {
    let mut config = ImageConfig::default();

    if let Some(path) = &cli.config {
        settings::load_settings(path)?.apply_to(&mut config)?;
    }

    let overrides = ConverterSettings {
        concurrency: cli.concurrency,
        ..Default::default()
    };
    overrides.apply_to(&mut config)?;

    if let Some(profile) = cli.profile {
        config.apply_performance_profile(profile);
    }

    log::info!(
        "⚙️ 配置 - 并发: {} 档位: {} 扩展名: {}",
        config.concurrency,
        config.infer_performance_profile().as_str(),
        config.extension
    );

    Ok(config)
}
