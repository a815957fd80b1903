//! LLM 服务 - 业务能力层
//!
//! 只负责"根据源代码生成输出文本"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::RemoteError;
use crate::models::Item;

/// 模拟终端输出时使用的系统消息
const CONSOLE_SYSTEM_MESSAGE: &str = "你是一个程序运行模拟器。\
根据用户给出的源代码，写出该程序在终端中运行时最可能出现的完整输出。\
只输出终端上显示的内容，不要解释，不要使用 Markdown 代码块。\
如果程序需要读取输入，请假设合理的示例输入，并像终端一样把输入回显在输出中。\
如果程序无法编译或运行，请输出对应编译器或解释器会给出的错误信息。";

/// 标记语言（HTML 等）使用的系统消息
const MARKUP_SYSTEM_MESSAGE: &str = "你是一个浏览器渲染模拟器。\
根据用户给出的标记文档，用纯文本写出页面在浏览器中打开后用户能看到的内容，\
按从上到下的顺序排列，保留标题、列表、表格、按钮等结构的文字表现。\
不要解释，不要输出源代码，不要使用 Markdown 代码块。";

/// 一次生成请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRequest {
    pub source: String,
    pub language: String,
    /// 为 true 时按浏览器页面生成，否则按终端输出生成
    pub is_markup: bool,
}

impl OutputRequest {
    pub fn from_item(item: &Item, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            language: item.language.clone(),
            is_markup: item.is_markup(),
        }
    }

    pub fn system_message(&self) -> &'static str {
        if self.is_markup {
            MARKUP_SYSTEM_MESSAGE
        } else {
            CONSOLE_SYSTEM_MESSAGE
        }
    }

    pub fn user_message(&self) -> String {
        let task = if self.is_markup {
            "请写出下面这个页面在浏览器中显示的内容"
        } else {
            "请写出下面这个程序运行后的终端输出"
        };
        format!(
            "{}（语言: {}）：\n\n```{}\n{}\n```",
            task, self.language, self.language, self.source
        )
    }
}

/// 远程输出服务
///
/// 流程层只依赖这个 trait，测试时可以替换为假实现
#[async_trait]
pub trait RemoteOutput: Send + Sync {
    async fn generate(&self, request: &OutputRequest) -> Result<String, RemoteError>;
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 生成单个条目的输出
/// - 只处理单个条目
/// - 不关心重试、截图和流程顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        // 关闭客户端内置的限流重试，429 在第一次就交给 RetryPolicy 处理
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        let client = Client::with_config(openai_config).with_backoff(no_retry);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（去掉首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: &str,
    ) -> Result<String, OpenAIError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.2)
            .max_tokens(2048u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            e
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl RemoteOutput for LlmService {
    async fn generate(&self, request: &OutputRequest) -> Result<String, RemoteError> {
        let content = self
            .send_to_llm(&request.user_message(), request.system_message())
            .await
            .map_err(to_remote_error)?;

        if content.is_empty() {
            return Err(RemoteError::new(format!(
                "LLM 返回内容为空 (模型: {})",
                self.model_name
            )));
        }

        Ok(strip_code_fence(&content))
    }
}

/// 转换为可供限流判断的远程错误
///
/// - `ApiError`：错误码和类型放在 `error.code` / `error.type`
/// - `JSONDeserialize`：原始响应能解析为 JSON 时整体作为错误体
/// - 其余错误只保留文本
fn to_remote_error(err: OpenAIError) -> RemoteError {
    let message = err.to_string();
    match err {
        OpenAIError::ApiError(api) => RemoteError::new(message).with_body(json!({
            "error": {
                "code": api.code,
                "type": api.r#type,
                "message": api.message,
            }
        })),
        OpenAIError::JSONDeserialize(_, content) => {
            match serde_json::from_str::<JsonValue>(&content) {
                Ok(body) => RemoteError::new(message).with_body(body),
                Err(_) => RemoteError::new(message),
            }
        }
        _ => RemoteError::new(message),
    }
}

/// 去掉模型偶尔包裹在外层的 Markdown 代码块
fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim_end()
        .to_string()
}
