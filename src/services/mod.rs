pub mod archive_builder;
pub mod llm_service;
pub mod naming;
pub mod retry;
pub mod snapshot_service;
pub mod terminal_view;

pub use archive_builder::build_archive;
pub use llm_service::{LlmService, OutputRequest, RemoteOutput};
pub use naming::format_name;
pub use retry::{classify_failure, FailureKind, RetryPolicy};
pub use snapshot_service::{SnapshotCapture, SnapshotService};
pub use terminal_view::TerminalView;
