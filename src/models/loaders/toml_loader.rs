use crate::error::{AppError, FileError};
use crate::models::naming::NamingConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载命名规则
///
/// 文件中缺失的字段使用默认值
pub async fn load_naming_config(toml_file_path: &Path) -> Result<NamingConfig> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(toml_file_path.display().to_string(), e))
        .with_context(|| format!("无法读取命名规则文件: {}", toml_file_path.display()))?;

    let config: NamingConfig = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source: e,
        })
    })?;

    tracing::info!(
        "✓ 已加载命名规则: 文件夹 '{}' | 截图 '{}' | 起始编号 {} | 编号{}",
        config.folder_pattern,
        config.screenshot_pattern,
        config.start_index,
        if config.numbering_enabled { "开启" } else { "关闭" }
    );

    Ok(config)
}
