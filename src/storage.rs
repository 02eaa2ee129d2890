//! 目录管理模块
//!
//! # 设计思路
//!
//! 统一管理批处理涉及的目录操作：输出目录的创建、输入目录的列举、目录占用统计。
//! 目录级失败对整批是致命的，因此这里统一返回 `AppError::Storage`。
//!
//! # 实现思路
//!
//! - `ensure_dir` 使用 `create_dir_all`：目录已存在视为成功，并发调用安全。
//! - `list_images` 只看一层，只收普通文件，按扩展名过滤，结果按路径排序。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::AppError;

/// 目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 确保目录存在（不存在时递归创建）。
///
/// # 返回
/// - `Ok(())` — 目录可用
/// - `Err(AppError::Storage)` — 无法创建目录
pub async fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Storage(format!("创建目录 '{}' 失败: {}", dir.display(), e)))
}

/// 列举目录下（不递归）文件名以 `extension` 结尾的普通文件。
///
/// 子目录与不匹配的文件被静默跳过。目录不存在或不可读时返回 `AppError::Storage`。
pub async fn list_images(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, AppError> {
    let list_err =
        |e: std::io::Error| AppError::Storage(format!("读取目录 '{}' 失败: {}", dir.display(), e));

    let mut entries = fs::read_dir(dir).await.map_err(list_err)?;
    let mut paths = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(err) => {
                log::warn!("跳过无法识别类型的条目 {}: {}", entry.path().display(), err);
                continue;
            }
        };
        if !file_type.is_file() {
            continue;
        }

        let name = entry.file_name();
        if name.to_string_lossy().ends_with(extension) {
            paths.push(entry.path());
        }
    }

    paths.sort();
    Ok(paths)
}

/// 获取目录信息（路径 + 占用大小 + 文件数，不递归）
pub async fn dir_info(dir: &Path) -> Result<StorageInfo, AppError> {
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| AppError::Storage(format!("读取目录 '{}' 失败: {}", dir.display(), e)))?;

    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Ok(metadata) = entry.metadata().await {
            if metadata.is_file() {
                total_size += metadata.len();
                file_count += 1;
            }
        }
    }

    Ok(StorageInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    })
}
