mod console_notifier;
mod dify_client;
mod disabled_session_repository;
mod duckdb_session_repository;
mod in_memory_session_repository;
mod mock_recommendation;
mod recording_notifier;

pub use console_notifier::*;
pub use dify_client::*;
pub use disabled_session_repository::*;
pub use duckdb_session_repository::*;
pub use in_memory_session_repository::*;
pub use mock_recommendation::*;
pub use recording_notifier::*;

/// Milliseconds since the Unix epoch; the write time stamped by session stores.
pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
