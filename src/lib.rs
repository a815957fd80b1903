//! # Snapshot Submit
//!
//! 批量把源代码文件交给 LLM 生成"运行输出"，渲染成终端窗口并截图，
//! 最后把源文件和截图按命名规则打包成 zip，用于课程作业提交。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 启动或连接浏览器
//! - `infrastructure/PageCapture` - 唯一的 page owner，提供渲染和截图能力
//!
//! ### ② 业务能力层（Services）
//! - `LlmService` - 生成输出文本
//! - `RetryPolicy` - 限流重试
//! - `SnapshotService` / `TerminalView` - 渲染与截图
//! - `naming` / `archive_builder` - 命名与打包
//!
//! ### ③ 流程层（Workflow）
//! - `ItemFlow` - 单个条目的完整流程（生成 → 等待 → 截图 → 记录）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_runner` - 顺序批量处理与单飞控制
//! - `orchestrator/batch_processor` - 应用生命周期
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Batch, BatchStats, BatchStore, Item, ItemId, ItemStatus, NamingConfig};
pub use orchestrator::{App, BatchRunner, RunOutcome};
pub use workflow::{ItemFlow, ItemOutcome};
