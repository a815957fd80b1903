use serde::{Deserialize, Serialize};

/// 命名规则配置
///
/// 支持的占位符：`[index]`、`[name]`、`[ext]`、`[full]`，
/// 具体展开规则见 [`crate::services::naming::format_name`]。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// 文件夹命名模板
    pub folder_pattern: String,
    /// 截图命名模板（不含 `.png` 后缀）
    pub screenshot_pattern: String,
    /// 起始编号（可以为 0 或负数）
    pub start_index: i64,
    /// 是否启用编号
    pub numbering_enabled: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            folder_pattern: "[index]_[name]".to_string(),
            screenshot_pattern: "[name]_output".to_string(),
            start_index: 1,
            numbering_enabled: true,
        }
    }
}
