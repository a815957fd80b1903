//! 源文件加载
//!
//! 分两步完成：先按文件名顺序入队，再为每个文件启动读取任务，
//! 读取完成后通过 [`BatchStore::set_content`] 通知等待方。

use crate::error::{AppError, FileError};
use crate::models::batch::BatchStore;
use crate::models::item::{ContentState, ItemId};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 扫描目录中的源文件并入队
///
/// 只读取目录第一层的普通文件，忽略以 `.` 开头的隐藏文件。
/// 返回的 id 顺序与入队顺序一致。
pub async fn load_sources(folder_path: &str, store: &BatchStore) -> Result<Vec<ItemId>> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(AppError::File(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        })
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with('.'));
        if entry.file_type().await?.is_file() && !is_hidden {
            paths.push(path);
        }
    }
    paths.sort();

    let mut ids = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let id = store.enqueue(&name);
        tracing::debug!("已入队: {} ({})", name, id);

        let store = store.clone();
        tokio::spawn(async move {
            let content = read_source(&path).await;
            store.set_content(id, content);
        });
        ids.push(id);
    }

    Ok(ids)
}

async fn read_source(path: &Path) -> ContentState {
    match fs::read(path).await {
        Ok(bytes) => ContentState::Ready(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            let err = AppError::file_read_failed(path.display().to_string(), e);
            tracing::warn!("{}", err);
            ContentState::Failed(err.to_string())
        }
    }
}
