pub mod batch;
pub mod item;
pub mod loaders;
pub mod naming;

pub use batch::{Batch, BatchStats, BatchStore};
pub use item::{language_from_name, ContentState, Item, ItemId, ItemStatus};
pub use loaders::{load_naming_config, load_sources};
pub use naming::NamingConfig;
