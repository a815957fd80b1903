pub mod item_ctx;
pub mod item_flow;

pub use item_ctx::ItemCtx;
pub use item_flow::{ItemFlow, ItemOutcome, RATE_LIMIT_DIAGNOSTIC};

#[cfg(test)]
pub(crate) mod test_support;
