//! 条目处理流程 - 流程层
//!
//! 核心职责：定义"一个文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 标记为处理中，等待文件内容就绪
//! 2. 远程生成输出（带限流重试），失败时写入诊断文本，条目照常完成
//! 3. 等待渲染稳定
//! 4. 截图：成功则附加图片，失败则标记为失败（保留输出）
//!
//! 所有写回都通过 [`BatchStore::update`]，条目中途被移除时写回自动失效。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::models::{BatchStore, ContentState, ItemId, ItemStatus};
use crate::services::retry::{classify_failure, FailureKind, RetryPolicy};
use crate::services::{OutputRequest, RemoteOutput, SnapshotCapture, TerminalView};
use crate::utils::truncate_text;
use crate::workflow::item_ctx::ItemCtx;

/// 限流重试用尽后写入的输出
pub const RATE_LIMIT_DIAGNOSTIC: &str = "⚠️ 输出生成失败：请求过于频繁（429 / RESOURCE_EXHAUSTED），\
多次重试后仍被限流。请稍等片刻后重新运行本条目。";

/// 条目处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// 输出和截图都已完成
    Completed,
    /// 截图失败或源文件读取失败
    Failed,
    /// 条目已被移除或状态不允许处理
    Skipped,
}

/// 条目处理流程
///
/// - 编排单个条目的生成、等待、截图、记录
/// - 不持有任何资源（page），只依赖业务能力（services）
/// - 任何单个条目的错误都在这里转换为状态，不向上抛出
pub struct ItemFlow {
    remote: Arc<dyn RemoteOutput>,
    snapshot: Arc<dyn SnapshotCapture>,
    retry: RetryPolicy,
    settle_delay: Duration,
}

impl ItemFlow {
    pub fn new(
        remote: Arc<dyn RemoteOutput>,
        snapshot: Arc<dyn SnapshotCapture>,
        retry: RetryPolicy,
        settle_delay: Duration,
    ) -> Self {
        Self {
            remote,
            snapshot,
            retry,
            settle_delay,
        }
    }

    pub async fn run(&self, store: &BatchStore, id: ItemId, ctx: &ItemCtx) -> ItemOutcome {
        match store.update(id, |item| item.transition(ItemStatus::Running)) {
            Some(true) => info!("{} ▶️ 开始处理", ctx),
            Some(false) => {
                warn!("{} ⚠️ 当前状态不允许处理，跳过", ctx);
                return ItemOutcome::Skipped;
            }
            None => {
                warn!("{} ⚠️ 条目已被移除，跳过", ctx);
                return ItemOutcome::Skipped;
            }
        }

        // ========== 1. 等待文件内容 ==========
        let source = match store.wait_for_content(id).await {
            Some(ContentState::Ready(text)) => text,
            Some(ContentState::Failed(reason)) => {
                error!("{} ❌ 源文件读取失败: {}", ctx, reason);
                store.update(id, |item| {
                    item.output = Some(format!("⚠️ 无法读取源文件：{}", reason));
                    item.transition(ItemStatus::Error)
                });
                return ItemOutcome::Failed;
            }
            Some(ContentState::Loading) | None => {
                warn!("{} ⚠️ 条目在等待内容时被移除", ctx);
                return ItemOutcome::Skipped;
            }
        };

        let Some(item) = store.get(id) else {
            return ItemOutcome::Skipped;
        };
        let request = OutputRequest::from_item(&item, source);

        // ========== 2. 生成输出 ==========
        info!("{} 🤖 正在生成输出...", ctx);
        let output = self.generate(&request, ctx).await;
        info!("{} ✓ 输出: {}", ctx, truncate_text(&output, 60));

        let recorded = store.update(id, |item| {
            if item.status != ItemStatus::Running {
                return false;
            }
            item.output = Some(output);
            item.transition(ItemStatus::Completed)
        });
        match recorded {
            Some(true) => {}
            Some(false) => {
                warn!("{} ⚠️ 条目状态已改变，丢弃输出", ctx);
                return ItemOutcome::Skipped;
            }
            None => {
                warn!("{} ⚠️ 条目已被移除，丢弃输出", ctx);
                return ItemOutcome::Skipped;
            }
        }

        // ========== 3. 等待渲染稳定 ==========
        sleep(self.settle_delay).await;

        // ========== 4. 截图 ==========
        let Some(item) = store.get(id) else {
            warn!("{} ⚠️ 条目已被移除，跳过截图", ctx);
            return ItemOutcome::Skipped;
        };
        if item.status != ItemStatus::Completed {
            warn!("{} ⚠️ 条目已重新排队，跳过截图", ctx);
            return ItemOutcome::Skipped;
        }
        let view = TerminalView::from_item(&item);

        let captured = self.snapshot.capture(&view).await;
        // 截图期间条目可能被移除或重新排队，只写回仍处于已完成状态的条目
        let recorded = store.update(id, |item| {
            if item.status != ItemStatus::Completed {
                return None;
            }
            Some(match captured {
                Ok(png) => {
                    info!("{} 📸 截图完成 ({} 字节)", ctx, png.len());
                    item.image = Some(png);
                    ItemOutcome::Completed
                }
                Err(e) => {
                    error!("{} ❌ 截图失败: {}", ctx, e);
                    item.transition(ItemStatus::Error);
                    ItemOutcome::Failed
                }
            })
        });

        recorded.flatten().unwrap_or_else(|| {
            warn!("{} ⚠️ 条目在截图期间被修改，丢弃截图结果", ctx);
            ItemOutcome::Skipped
        })
    }

    /// 调用远程服务，失败时返回诊断文本
    async fn generate(&self, request: &OutputRequest, ctx: &ItemCtx) -> String {
        let result = self
            .retry
            .call_with_retry(|| self.remote.generate(request))
            .await;

        match result {
            Ok(output) => output,
            Err(e) if classify_failure(&e) == FailureKind::RateLimited => {
                error!("{} ❌ 限流重试已用尽: {}", ctx, e);
                RATE_LIMIT_DIAGNOSTIC.to_string()
            }
            Err(e) => {
                error!("{} ❌ 输出生成失败: {}", ctx, e);
                format!("⚠️ 输出生成失败：{}", e)
            }
        }
    }
}
