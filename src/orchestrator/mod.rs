//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用主流程
//! - 管理应用生命周期（初始化、运行、打包）
//! - 持有浏览器资源
//! - 输出全局统计信息
//!
//! ### `batch_runner` - 批量执行器
//! - 单飞控制（同一时间只有一次批量运行）
//! - 按顺序处理未完成的条目，条目之间保持间隔
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (App: 加载 → 运行 → 打包)
//!     ↓
//! batch_runner (处理 Vec<Item>，顺序执行)
//!     ↓
//! workflow::ItemFlow (处理单个 Item)
//!     ↓
//! services (能力层：llm / retry / snapshot / naming / archive)
//!     ↓
//! infrastructure (基础设施：PageCapture)
//! ```

pub mod batch_processor;
pub mod batch_runner;

// 重新导出主要类型
pub use batch_processor::App;
pub use batch_runner::{BatchRunner, RunOutcome};
