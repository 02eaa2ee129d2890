//! 压缩包解压模块
//!
//! # 设计思路
//!
//! 把 zip 压缩包完整展开到目标目录，供批处理作为输入目录使用。
//! 压缩包损坏或无法读取对整次运行是致命的，统一返回 `AppError::Extract`。
//!
//! # 实现思路
//!
//! - 目标目录不存在时递归创建。
//! - 以 `/` 结尾的条目视为目录；文件条目写入前先创建父目录。
//! - 条目名可能越出目标目录（绝对路径、`..`），这类条目跳过并告警。
//! - 同步实现，异步调用方放在 `spawn_blocking` 中执行。

use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::error::AppError;

/// 解压统计
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    pub skipped: usize,
}

/// 将 `archive_path` 解压到 `dest_dir`。
pub fn extract(archive_path: &Path, dest_dir: &Path) -> Result<ExtractSummary, AppError> {
    log::info!(
        "📂 开始解压 - 压缩包: {} 目标: {}",
        archive_path.display(),
        dest_dir.display()
    );

    let file = File::open(archive_path).map_err(|e| {
        AppError::Extract(format!("无法打开压缩包 '{}': {}", archive_path.display(), e))
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        AppError::Extract(format!("压缩包损坏 '{}': {}", archive_path.display(), e))
    })?;

    fs::create_dir_all(dest_dir).map_err(|e| {
        AppError::Storage(format!("创建目录 '{}' 失败: {}", dest_dir.display(), e))
    })?;

    let mut summary = ExtractSummary::default();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| AppError::Extract(format!("读取第 {} 个条目失败: {}", index, e)))?;

        let name = entry.name().to_string();
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("⚠️ 跳过不安全的条目路径: {}", name);
            summary.skipped += 1;
            continue;
        };
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| entry_error(&name, e))?;
            summary.directories += 1;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| entry_error(&name, e))?;
        }

        let mut out = File::create(&out_path).map_err(|e| entry_error(&name, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| entry_error(&name, e))?;
        summary.files += 1;
    }

    log::info!(
        "✅ 解压完成 - 文件 {} 目录 {} 跳过 {}",
        summary.files,
        summary.directories,
        summary.skipped
    );

    Ok(summary)
}

/// 单个条目落盘失败同样属于解压失败。
fn entry_error(name: &str, err: io::Error) -> AppError {
    AppError::Extract(format!("解压条目 '{}' 失败: {}", name, err))
}
