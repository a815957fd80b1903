//! 测试用的远程服务与截图服务

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CaptureError, RemoteError};
use crate::services::{OutputRequest, RemoteOutput, SnapshotCapture, TerminalView};

/// 记录请求的假远程服务
pub struct FakeRemote {
    failure: Option<RemoteError>,
    requests: Mutex<Vec<OutputRequest>>,
}

impl FakeRemote {
    pub fn ok() -> Self {
        Self {
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 每次调用都返回同一个错误
    pub fn failing(err: RemoteError) -> Self {
        Self {
            failure: Some(err),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<OutputRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteOutput for FakeRemote {
    async fn generate(&self, request: &OutputRequest) -> Result<String, RemoteError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(format!("output of {}", request.source)),
        }
    }
}

/// 对指定文件名截图失败的假截图服务
pub struct FakeSnapshot {
    failing_titles: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeSnapshot {
    pub fn ok() -> Self {
        Self::failing_on(&[])
    }

    pub fn failing_on(titles: &[&str]) -> Self {
        Self {
            failing_titles: titles.iter().map(|t| t.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotCapture for FakeSnapshot {
    async fn capture(&self, view: &TerminalView) -> Result<Vec<u8>, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_titles.contains(&view.title) {
            Err(CaptureError::EmptyImage)
        } else {
            Ok(view.title.as_bytes().to_vec())
        }
    }
}
