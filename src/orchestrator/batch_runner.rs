//! 批量执行器 - 编排层
//!
//! ## 职责
//!
//! 1. **单飞控制**：同一时间只允许一次批量运行，重复调用直接拒绝
//! 2. **顺序处理**：按入队顺序逐个处理未完成的条目，绝不并发调用远程服务
//! 3. **节奏控制**：两个条目之间固定间隔，降低限流压力
//! 4. **统计**：汇总完成 / 失败 / 跳过数量
//!
//! 单个条目的失败不会中断整批处理。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::models::{BatchStats, BatchStore, ItemId};
use crate::utils::logging::log_batch_start;
use crate::workflow::{ItemCtx, ItemFlow, ItemOutcome};

/// 一次运行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 已有批量任务在运行，本次调用被拒绝
    Busy,
    Finished(BatchStats),
}

/// 持有单飞标记期间的守卫，离开作用域时释放标记
struct ProcessingGuard<'a>(&'a BatchStore);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.finish_processing();
    }
}

/// 批量执行器
pub struct BatchRunner {
    store: BatchStore,
    flow: ItemFlow,
    pacing_delay: Duration,
}

impl BatchRunner {
    pub fn new(store: BatchStore, flow: ItemFlow, pacing_delay: Duration) -> Self {
        Self {
            store,
            flow,
            pacing_delay,
        }
    }

    pub fn store(&self) -> &BatchStore {
        &self.store
    }

    /// 处理所有未完成的条目
    ///
    /// 已完成的条目不会重新生成或重新截图
    pub async fn run_batch(&self) -> RunOutcome {
        let Some(_guard) = self.begin() else {
            return RunOutcome::Busy;
        };

        let batch = self.store.snapshot();
        let ids = batch.unfinished_ids();
        log_batch_start(ids.len(), batch.items.len());

        let stats = self.process_sequence(&ids).await;
        info!(
            "✓ 批量处理结束: 完成 {} | 失败 {} | 跳过 {}",
            stats.completed, stats.failed, stats.skipped
        );
        RunOutcome::Finished(stats)
    }

    /// 处理单个条目，同样受单飞标记约束
    pub async fn run_one(&self, id: ItemId) -> RunOutcome {
        let Some(_guard) = self.begin() else {
            return RunOutcome::Busy;
        };
        RunOutcome::Finished(self.process_sequence(&[id]).await)
    }

    fn begin(&self) -> Option<ProcessingGuard<'_>> {
        if self.store.try_begin_processing() {
            Some(ProcessingGuard(&self.store))
        } else {
            warn!("⚠️ 已有批量任务正在运行，本次请求被忽略");
            None
        }
    }

    async fn process_sequence(&self, ids: &[ItemId]) -> BatchStats {
        let mut stats = BatchStats::default();
        let total = ids.len();

        for (index, &id) in ids.iter().enumerate() {
            let name = self.store.get(id).map(|item| item.name).unwrap_or_default();
            let ctx = ItemCtx::new(index + 1, total, name);

            match self.flow.run(&self.store, id, &ctx).await {
                ItemOutcome::Completed => stats.completed += 1,
                ItemOutcome::Failed => stats.failed += 1,
                ItemOutcome::Skipped => stats.skipped += 1,
            }

            if index + 1 < total {
                sleep(self.pacing_delay).await;
            }
        }

        stats
    }
}
