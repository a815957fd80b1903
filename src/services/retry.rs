//! 重试与退避策略 - 业务能力层
//!
//! 只对限流错误（429）重试，其他错误立即返回。

use std::future::Future;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::RemoteError;

/// 限流状态码
const RATE_LIMIT_STATUS: u64 = 429;

/// 错误体中可能携带状态码的字段，按顺序检查
const STATUS_FIELD_PATHS: &[&[&str]] = &[
    &["status"],
    &["code"],
    &["response", "status"],
    &["error", "code"],
    &["error", "status"],
];

/// 表示限流的字符串错误码（OpenAI / Gemini）
const RATE_LIMIT_CODES: &[&str] = &["rate_limit_exceeded", "RESOURCE_EXHAUSTED"];

/// OpenAI 限流错误的 `error.type`
const RATE_LIMIT_ERROR_TYPES: &[&str] = &["requests", "tokens"];

/// 错误文本中表示限流的标记
const RATE_LIMIT_MARKERS: &[&str] = &["429", "RESOURCE_EXHAUSTED"];

/// 失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    Other,
}

/// 判断远程错误是否为限流
///
/// 检查顺序：
/// 1. `RemoteError::status`
/// 2. 错误体字段：`status`、`code`、`response.status`、`error.code`、`error.status`
///    为 429 或限流错误码，或 `error.type` 为 `requests` / `tokens`
/// 3. 错误文本中是否包含 `429` 或 `RESOURCE_EXHAUSTED`
pub fn classify_failure(err: &RemoteError) -> FailureKind {
    if err.status.map(u64::from) == Some(RATE_LIMIT_STATUS) {
        return FailureKind::RateLimited;
    }

    if let Some(body) = &err.body {
        let hit = STATUS_FIELD_PATHS
            .iter()
            .filter_map(|path| lookup(body, path))
            .any(is_rate_limit_code);
        let limited_type = lookup(body, &["error", "type"])
            .and_then(JsonValue::as_str)
            .is_some_and(|t| RATE_LIMIT_ERROR_TYPES.contains(&t));
        if hit || limited_type {
            return FailureKind::RateLimited;
        }
    }

    let text = err.to_string();
    if RATE_LIMIT_MARKERS.iter().any(|marker| text.contains(marker)) {
        return FailureKind::RateLimited;
    }

    FailureKind::Other
}

fn lookup<'a>(body: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    path.iter().try_fold(body, |value, key| value.get(key))
}

fn is_rate_limit_code(value: &JsonValue) -> bool {
    match value {
        JsonValue::Number(n) => n.as_u64() == Some(RATE_LIMIT_STATUS),
        JsonValue::String(s) => {
            let s = s.trim();
            s == "429" || RATE_LIMIT_CODES.contains(&s)
        }
        _ => false,
    }
}

/// 重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 总尝试次数（含第一次）
    pub max_attempts: u32,
    /// 第一次重试前的等待时间，之后每次翻倍
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(1500),
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次尝试（从 1 开始，且 >= 2）之前的等待时间
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(2);
        self.base_delay * 2u32.saturating_pow(exponent)
    }

    /// 带重试地执行远程调用
    ///
    /// - 非限流错误：立即返回，不重试
    /// - 限流错误：等待后重试，直到用完 `max_attempts` 次
    pub async fn call_with_retry<T, F, Fut>(&self, mut make_request: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt = 1;
        loop {
            debug!("远程调用 (尝试 {}/{})", attempt, self.max_attempts);

            let err = match make_request().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if classify_failure(&err) == FailureKind::Other {
                debug!("非限流错误，不重试: {}", err);
                return Err(err);
            }

            if attempt >= self.max_attempts {
                warn!("请求频率限制，已尝试 {} 次，放弃", attempt);
                return Err(err);
            }

            attempt += 1;
            let delay = self.delay_before(attempt);
            warn!(
                "API 请求频繁限制 (尝试 {}/{}), 等待 {:.1} 秒后重试...",
                attempt - 1,
                self.max_attempts,
                delay.as_secs_f64()
            );
            sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn rate_limited() -> RemoteError {
        RemoteError::new("too many requests").with_status(429)
    }

    #[test]
    fn test_classify_by_status_field() {
        assert_eq!(classify_failure(&rate_limited()), FailureKind::RateLimited);
        assert_eq!(
            classify_failure(&RemoteError::new("server error").with_status(500)),
            FailureKind::Other
        );
    }

    #[test]
    fn test_classify_by_body_shapes() {
        let shapes = [
            json!({"status": 429}),
            json!({"code": 429}),
            json!({"response": {"status": 429}}),
            json!({"error": {"code": 429}}),
            json!({"error": {"status": 429}}),
            json!({"error": {"code": "429"}}),
            json!({"error": {"code": "rate_limit_exceeded", "type": null}}),
            json!({"error": {"code": null, "type": "tokens"}}),
            json!({"error": {"status": "RESOURCE_EXHAUSTED"}}),
        ];
        for body in shapes {
            let err = RemoteError::new("failed").with_body(body.clone());
            assert_eq!(classify_failure(&err), FailureKind::RateLimited, "{body}");
        }

        let err = RemoteError::new("failed").with_body(json!({"error": {"code": 400}}));
        assert_eq!(classify_failure(&err), FailureKind::Other);
        let err = RemoteError::new("failed").with_body(json!({
            "error": {"code": "insufficient_quota", "type": "insufficient_quota"}
        }));
        assert_eq!(classify_failure(&err), FailureKind::Other);
    }

    #[test]
    fn test_classify_by_text_marker() {
        assert_eq!(
            classify_failure(&RemoteError::new("HTTP 429 Too Many Requests")),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_failure(&RemoteError::new("status: RESOURCE_EXHAUSTED")),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_failure(&RemoteError::new("connection reset")),
            FailureKind::Other
        );
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(2), Duration::from_millis(1500));
        assert_eq!(policy.delay_before(3), Duration::from_millis(3000));
        assert_eq!(policy.delay_before(4), Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_rate_limit_then_succeeds() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result = policy
            .call_with_retry(|| {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n <= 3 {
                        Err(rate_limited())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        // 1.5s + 3s + 6s
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10_500), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(10_550), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_error_propagates_immediately() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), _> = policy
            .call_with_retry(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(RemoteError::new("bad request").with_status(400)) }
            })
            .await;

        assert_eq!(result.unwrap_err().status, Some(400));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhausts_attempts() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .call_with_retry(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(rate_limited()) }
            })
            .await;

        assert_eq!(classify_failure(&result.unwrap_err()), FailureKind::RateLimited);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }
}
