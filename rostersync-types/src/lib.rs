//! Core type definitions for rostersync.
//!
//! This crate defines the records that flow through a reconciliation pass:
//! - Roster entries (`Entity`) as returned by the remote roster call
//! - Per-entity detail records (`DetailRecord`) with their statistics
//! - The store's composite key (`RecordKey`)
//!
//! Store- and source-specific wire formats live in their own crates; these
//! types only carry the serde attribute names the store persists.

mod key;
mod record;

pub use key::{Entity, RecordKey};
pub use record::{DetailRecord, Position, ScoreCategory};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown score category: {0}")]
    UnknownCategory(u8),

    #[error("invalid record key: {0}")]
    InvalidKey(String),
}
