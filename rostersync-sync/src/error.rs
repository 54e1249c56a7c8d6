//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
///
/// Entity- and chunk-scoped errors are recorded in reports and never abort a
/// pass; see [`SyncError::is_fatal`] for the ones that do.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote source request failed.
    #[error("network error: {0}")]
    Network(String),

    /// Remote payload could not be parsed.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A store response could not be decoded into records.
    #[error("decode error: {0}")]
    Decode(String),

    /// Store round trip failed (network, auth, throttling).
    #[error("transport error: {0}")]
    Transport(String),

    /// The store rejected a request as malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A spawned worker task failed to report.
    #[error("task error: {0}")]
    Task(String),

    /// Missing or invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The roster could not be loaded.
    #[error("roster unavailable: {0}")]
    Roster(String),

    /// A pass completed but left items unwritten.
    #[error("pass incomplete: {unprocessed} unprocessed, {failed} failed")]
    Incomplete { unprocessed: usize, failed: usize },
}

impl SyncError {
    /// Returns true if this error aborts a whole pass rather than one item
    /// or one batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Config(_) | SyncError::Roster(_))
    }
}
