//! 批次状态容器
//!
//! 整个批次只有一份状态，由 [`BatchStore`] 持有。
//! 多个展示端可以通过 `subscribe()` 获得一致的视图，
//! 所有修改都经过 store 完成，不存在全局可变状态。

use std::sync::Arc;

use tokio::sync::watch;

use super::item::{ContentState, Item, ItemId, ItemStatus};

/// 批次：按入队顺序排列的条目 + 单飞标记
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub items: Vec<Item>,
    /// 是否有批量任务正在运行
    pub processing: bool,
}

impl Batch {
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// 需要处理的条目（状态不是已完成），保持原有顺序
    pub fn unfinished_ids(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| item.status != ItemStatus::Completed)
            .map(|item| item.id)
            .collect()
    }
}

/// 批量处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub completed: usize,
    pub failed: usize,
    /// 处理过程中被移除的条目
    pub skipped: usize,
}

/// 批次状态容器
#[derive(Debug, Clone)]
pub struct BatchStore {
    tx: Arc<watch::Sender<Batch>>,
}

impl BatchStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Batch::default());
        Self { tx: Arc::new(tx) }
    }

    /// 订阅批次变化
    pub fn subscribe(&self) -> watch::Receiver<Batch> {
        self.tx.subscribe()
    }

    /// 当前批次的快照
    pub fn snapshot(&self) -> Batch {
        self.tx.borrow().clone()
    }

    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.tx.borrow().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_processing(&self) -> bool {
        self.tx.borrow().processing
    }

    /// 新增条目（内容稍后通过 [`BatchStore::set_content`] 填充）
    pub fn enqueue(&self, name: impl Into<String>) -> ItemId {
        let item = Item::new(name);
        let id = item.id;
        self.tx.send_modify(|batch| batch.items.push(item));
        id
    }

    /// 修改指定条目；条目已被移除时不做任何事并返回 `None`
    pub fn update<R>(&self, id: ItemId, f: impl FnOnce(&mut Item) -> R) -> Option<R> {
        let mut result = None;
        self.tx.send_if_modified(|batch| {
            match batch.items.iter_mut().find(|item| item.id == id) {
                Some(item) => {
                    result = Some(f(item));
                    true
                }
                None => false,
            }
        });
        result
    }

    pub fn set_content(&self, id: ItemId, content: ContentState) -> bool {
        self.update(id, |item| item.content = content).is_some()
    }

    /// 重新排队；条目不存在或正在处理时返回 `false`
    pub fn requeue(&self, id: ItemId) -> bool {
        self.update(id, Item::requeue).unwrap_or(false)
    }

    pub fn remove(&self, id: ItemId) -> bool {
        self.tx.send_if_modified(|batch| {
            let before = batch.items.len();
            batch.items.retain(|item| item.id != id);
            batch.items.len() != before
        })
    }

    pub fn clear(&self) {
        self.tx.send_modify(|batch| batch.items.clear());
    }

    /// 尝试获取单飞标记，已有任务运行时返回 false
    pub fn try_begin_processing(&self) -> bool {
        self.tx.send_if_modified(|batch| {
            if batch.processing {
                false
            } else {
                batch.processing = true;
                true
            }
        })
    }

    pub fn finish_processing(&self) {
        self.tx.send_modify(|batch| batch.processing = false);
    }

    /// 等待条目内容加载结束（成功或失败）
    ///
    /// 条目在等待期间被移除时返回 `None`
    pub async fn wait_for_content(&self, id: ItemId) -> Option<ContentState> {
        let mut rx = self.tx.subscribe();
        let batch = rx
            .wait_for(|batch| match batch.get(id) {
                Some(item) => !item.content.is_loading(),
                None => true,
            })
            .await
            .ok()?;
        batch.get(id).map(|item| item.content.clone())
    }
}

impl Default for BatchStore {
    fn default() -> Self {
        Self::new()
    }
}
