pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_headless_browser;

use anyhow::Result;
use chromiumoxide::{Browser, Page};

use crate::config::Config;

/// 按配置启动无头浏览器或连接已有浏览器
pub async fn open_browser(config: &Config) -> Result<(Browser, Page)> {
    if config.browser_headless {
        launch_headless_browser(config.browser_executable.as_deref()).await
    } else {
        connect_to_browser(config.browser_debug_port).await
    }
}
