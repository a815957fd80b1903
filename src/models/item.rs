//! 条目模型
//!
//! 一个条目 = 一个上传的源文件 + 生成的输出 + 可选的截图

use std::fmt::{self, Display};

use uuid::Uuid;

/// 条目唯一标识（在同一批次内唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 条目状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl ItemStatus {
    /// 判断状态迁移是否合法
    ///
    /// - `Completed -> Error`：输出已生成但截图失败
    /// - `Error -> Running`：批量重跑时重新处理失败条目
    /// - 已完成的条目只能通过 [`Item::requeue`] 回到 `Pending`
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        use ItemStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Running, Completed)
                | (Running, Error)
                | (Completed, Error)
                | (Error, Running)
        )
    }
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemStatus::Pending => "待处理",
            ItemStatus::Running => "处理中",
            ItemStatus::Completed => "已完成",
            ItemStatus::Error => "失败",
        };
        f.write_str(label)
    }
}

/// 文件内容的加载状态
///
/// 条目先入队，文件内容随后异步到达
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentState {
    Loading,
    Ready(String),
    Failed(String),
}

impl ContentState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ContentState::Loading)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ContentState::Ready(text) => Some(text),
            _ => None,
        }
    }
}

/// 被视为标记语言的扩展名（以浏览器窗口形式展示）
const MARKUP_LANGUAGES: &[&str] = &["html", "htm", "xhtml"];

/// 单个处理条目
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    /// 原始文件名
    pub name: String,
    pub content: ContentState,
    /// 语言标记（由扩展名推导）
    pub language: String,
    pub status: ItemStatus,
    pub output: Option<String>,
    /// PNG 截图
    pub image: Option<Vec<u8>>,
}

impl Item {
    /// 创建新条目，内容处于加载中
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let language = language_from_name(&name);
        Self {
            id: ItemId::new(),
            name,
            content: ContentState::Loading,
            language,
            status: ItemStatus::Pending,
            output: None,
            image: None,
        }
    }

    pub fn is_markup(&self) -> bool {
        MARKUP_LANGUAGES.contains(&self.language.as_str())
    }

    /// 迁移状态，不合法的迁移返回 false 且不做修改
    pub fn transition(&mut self, next: ItemStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        if next == ItemStatus::Completed && self.output.is_none() {
            return false;
        }
        self.status = next;
        true
    }

    /// 由调用方显式重新排队：清空输出与截图，回到 `Pending`
    ///
    /// 处理中的条目不能重新排队，返回 `false`
    pub fn requeue(&mut self) -> bool {
        if self.status == ItemStatus::Running {
            return false;
        }
        self.status = ItemStatus::Pending;
        self.output = None;
        self.image = None;
        true
    }
}

/// 由文件名推导语言标记：最后一个扩展名的小写形式，没有扩展名时为 `text`
pub fn language_from_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => "text".to_string(),
    }
}
