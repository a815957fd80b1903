//! 页面截图器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"渲染 HTML"和"截图元素"的能力

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::Page;
use tracing::debug;

use crate::error::CaptureError;

/// 页面截图器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 render() / screenshot_element() 能力
/// - 不认识 Item / Batch
/// - 不处理业务流程
pub struct PageCapture {
    page: Page,
}

impl PageCapture {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 用给定 HTML 替换当前页面内容
    pub async fn render(&self, html: &str) -> Result<(), CaptureError> {
        debug!("渲染页面，HTML 长度: {} 字节", html.len());
        self.page
            .set_content(html)
            .await
            .map_err(CaptureError::render_failed)?;
        Ok(())
    }

    /// 对指定元素截图，返回 PNG 数据
    pub async fn screenshot_element(&self, selector: &str) -> Result<Vec<u8>, CaptureError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| CaptureError::element_not_found(selector, e))?;

        let png = element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .map_err(CaptureError::screenshot_failed)?;

        if png.is_empty() {
            return Err(CaptureError::EmptyImage);
        }

        debug!("截图完成: {} ({} 字节)", selector, png.len());
        Ok(png)
    }
}
