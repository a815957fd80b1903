//! 截图服务 - 业务能力层
//!
//! 只负责"把一个视图变成 PNG"能力，不关心流程

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CaptureError;
use crate::infrastructure::PageCapture;
use crate::services::terminal_view::{TerminalView, SNAPSHOT_SELECTOR};

/// 截图能力
///
/// 流程层只依赖这个 trait，测试时可以替换为假实现
#[async_trait]
pub trait SnapshotCapture: Send + Sync {
    async fn capture(&self, view: &TerminalView) -> Result<Vec<u8>, CaptureError>;
}

/// 基于浏览器页面的截图服务
///
/// 同一时间只有一个视图占用页面，渲染和截图在同一把锁内完成
pub struct SnapshotService {
    capture: Mutex<PageCapture>,
}

impl SnapshotService {
    pub fn new(capture: PageCapture) -> Self {
        Self {
            capture: Mutex::new(capture),
        }
    }
}

#[async_trait]
impl SnapshotCapture for SnapshotService {
    async fn capture(&self, view: &TerminalView) -> Result<Vec<u8>, CaptureError> {
        let capture = self.capture.lock().await;
        debug!("截图: {}", view.title);

        capture.render(&view.render_html()).await?;
        capture.screenshot_element(SNAPSHOT_SELECTOR).await
    }
}
