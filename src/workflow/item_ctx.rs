//! 条目处理上下文
//!
//! 封装"我正在处理本批第几个文件"这一信息，仅用于日志

use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 在本次处理序列中的位置（从1开始）
    pub position: usize,
    /// 本次处理序列的长度
    pub total: usize,
    pub file_name: String,
}

impl ItemCtx {
    pub fn new(position: usize, total: usize, file_name: impl Into<String>) -> Self {
        Self {
            position,
            total,
            file_name: file_name.into(),
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[条目 {}/{} {}]", self.position, self.total, self.file_name)
    }
}
