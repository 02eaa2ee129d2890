//! # 批量灰度转换工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 main.rs（CLI：clap + env_logger）          │
//! │     解压 → 批量转换 → 输出汇总 / JSON 报告                  │
//! └───────┬──────────────────────────┬───────────────────────┘
//!         ↓                          ↓
//! ┌─ archive ── zip 解压      ┌─ batch ── BatchConverter
//! │                           │   ├─ job       任务计划
//! │                           │   ├─ converter 有界并发 + 取消
//! │                           │   └─ report    逐文件结果
//! │                           ↓
//! │                    image_handler（单文件链路）
//! │                      ├─ loader    读取 / 写出
//! │                      ├─ pipeline  限制校验
//! │                      ├─ codec     PNG ⇄ PixelBuffer
//! │                      └─ transform 灰度变换
//! │
//! ├─ storage   目录创建 / 列举 / 统计
//! ├─ settings  JSON 配置文件
//! └─ error     AppError（整批致命错误）
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，整批致命错误 |
//! | [`archive`] | 将 zip 压缩包解压到目录 |
//! | [`batch`] | 列举输入、并发转换、汇总报告 |
//! | [`image_handler`] | PNG 解码、灰度变换、编码、单文件编排 |
//! | [`storage`] | 目录创建、图片列举、目录统计 |
//! | [`settings`] | JSON 配置文件的读取与校验 |

pub mod archive;
pub mod batch;
pub mod error;
pub mod image_handler;
pub mod settings;
pub mod storage;
