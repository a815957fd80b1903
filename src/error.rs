//! 错误类型
//!
//! 按业务域分层：远程生成、截图、打包、文件、配置。
//! 单个条目的远程/截图错误会在流程层被转换为状态更新，
//! 只有打包错误会作为整次操作的失败返回给调用方。

use serde_json::Value as JsonValue;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 远程输出服务错误
    #[error("远程服务错误: {0}")]
    Remote(#[from] RemoteError),
    /// 截图错误
    #[error("截图错误: {0}")]
    Capture(#[from] CaptureError),
    /// 打包错误
    #[error("打包错误: {0}")]
    Archive(#[from] ArchiveError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 远程输出服务错误
///
/// 远程接口的错误形状并不统一，这里保留三类可供检查的信息：
/// HTTP 状态码、原始错误体（JSON）以及文本描述。
/// 限流判断见 [`crate::services::retry::classify_failure`]。
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RemoteError {
    /// HTTP 状态码（如果已知）
    pub status: Option<u16>,
    /// 原始错误体
    pub body: Option<JsonValue>,
    /// 错误描述
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }
}

/// 截图错误
#[derive(Debug, Error)]
pub enum CaptureError {
    /// 页面渲染失败
    #[error("页面渲染失败: {source}")]
    RenderFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目标元素不存在
    #[error("未找到截图元素: {selector}")]
    ElementNotFound {
        selector: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 截图失败
    #[error("截图失败: {source}")]
    ScreenshotFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 截图结果为空
    #[error("截图结果为空")]
    EmptyImage,
}

/// 打包错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// 写入压缩包条目失败
    #[error("写入压缩包条目失败 ({entry}): {source}")]
    EntryFailed {
        entry: String,
        source: zip::result::ZipError,
    },
    /// 写入条目内容失败
    #[error("写入条目内容失败 ({entry}): {source}")]
    WriteFailed {
        entry: String,
        source: std::io::Error,
    },
    /// 结束压缩包失败
    #[error("生成压缩包失败: {0}")]
    FinishFailed(#[source] zip::result::ZipError),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        source: toml::de::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    BrowserConfigFailed(String),
}

// ========== 便捷构造函数 ==========

impl CaptureError {
    pub fn render_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        CaptureError::RenderFailed {
            source: Box::new(source),
        }
    }

    pub fn element_not_found(
        selector: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CaptureError::ElementNotFound {
            selector: selector.into(),
            source: Box::new(source),
        }
    }

    pub fn screenshot_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        CaptureError::ScreenshotFailed {
            source: Box::new(source),
        }
    }
}

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
