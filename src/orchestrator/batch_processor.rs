//! 应用主流程 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源管理和一次完整运行的编排。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、加载命名规则、打开浏览器、创建各项服务
//! 2. **加载源文件**：扫描输入目录，条目先入队，内容异步填充
//! 3. **批量处理**：委托 `BatchRunner` 顺序处理所有条目
//! 4. **打包输出**：生成 zip 并写入磁盘，失败时保留批次状态
//! 5. **全局统计**：输出最终的处理结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **向下委托**：单个条目的处理交给 workflow 层

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::PageCapture;
use crate::models::{load_naming_config, load_sources, BatchStats, BatchStore, NamingConfig};
use crate::orchestrator::batch_runner::{BatchRunner, RunOutcome};
use crate::services::{
    build_archive, LlmService, RemoteOutput, RetryPolicy, SnapshotCapture, SnapshotService,
};
use crate::utils::logging::{init_log_file, log_items_loaded, log_startup, print_final_stats};
use crate::workflow::ItemFlow;

/// 应用主结构
pub struct App {
    config: Config,
    naming: NamingConfig,
    runner: BatchRunner,
    _browser: Option<Browser>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config.llm_model_name, config.browser_headless);
        if config.verbose_logging {
            info!(
                "🔧 输入目录: {} | 输出: {} | 渲染等待 {}ms | 条目间隔 {}ms",
                config.input_folder,
                config.output_archive,
                config.settle_delay_ms,
                config.pacing_delay_ms
            );
        }

        let naming = match &config.naming_config_file {
            Some(path) => load_naming_config(Path::new(path)).await?,
            None => NamingConfig::default(),
        };

        // 打开浏览器，创建截图服务（持有 page）
        let (browser, page) = browser::open_browser(&config).await?;
        let snapshot = Arc::new(SnapshotService::new(PageCapture::new(page)));
        let remote = Arc::new(LlmService::new(&config));

        let mut app = Self::with_services(config, naming, remote, snapshot);
        app._browser = Some(browser);
        Ok(app)
    }

    /// 使用给定的服务组装应用（不打开浏览器）
    pub fn with_services(
        config: Config,
        naming: NamingConfig,
        remote: Arc<dyn RemoteOutput>,
        snapshot: Arc<dyn SnapshotCapture>,
    ) -> Self {
        let flow = ItemFlow::new(
            remote,
            snapshot,
            RetryPolicy::default(),
            Duration::from_millis(config.settle_delay_ms),
        );
        let runner = BatchRunner::new(
            BatchStore::new(),
            flow,
            Duration::from_millis(config.pacing_delay_ms),
        );

        Self {
            config,
            naming,
            runner,
            _browser: None,
        }
    }

    pub fn store(&self) -> &BatchStore {
        self.runner.store()
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchStats> {
        info!("\n📁 正在扫描待处理的文件...");
        let ids = load_sources(&self.config.input_folder, self.store()).await?;

        if ids.is_empty() {
            warn!("⚠️ 没有找到待处理的文件，程序结束");
            return Ok(BatchStats::default());
        }
        log_items_loaded(ids.len());

        let stats = match self.runner.run_batch().await {
            RunOutcome::Finished(stats) => stats,
            RunOutcome::Busy => anyhow::bail!("已有批量任务正在运行"),
        };

        self.package().await?;

        print_final_stats(
            &stats,
            &self.config.output_archive,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 打包当前批次并写入磁盘
    ///
    /// 失败时批次状态保持不变，可以再次调用
    pub async fn package(&self) -> Result<()> {
        let batch = self.store().snapshot();
        info!("📦 正在打包 {} 个条目...", batch.items.len());

        let archive = build_archive(&batch.items, &self.naming).map_err(|e| {
            error!("❌ 打包失败: {}", e);
            AppError::from(e)
        })?;

        tokio::fs::write(&self.config.output_archive, &archive)
            .await
            .map_err(|e| AppError::file_write_failed(&self.config.output_archive, e))
            .with_context(|| format!("无法保存压缩包: {}", self.config.output_archive))?;
        info!("✓ 压缩包已写入: {}", self.config.output_archive);

        if self.config.reset_after_package {
            self.store().clear();
            info!("🧹 已清空本批条目");
        }

        Ok(())
    }
}
