//! Bulk synchronization engine for rostersync.
//!
//! Pulls a roster and its per-entity detail records from a remote source
//! and reconciles them into a key-value store whose bulk operations are
//! capped at fixed batch sizes.
//!
//! ## Components
//!
//! - **Chunker**: splits ordered inputs into provider-sized batches
//! - **Executor**: one store round trip per chunk, collecting unprocessed
//!   items and chunk failures without aborting
//! - **Fetcher**: bounded-concurrency detail fetches with per-entity
//!   failure isolation
//! - **Reconciler**: reads what exists, purges it, fetches fresh records
//!   and re-inserts them
//!
//! # Example
//!
//! ```
//! use rostersync_sync::{MemoryStore, SyncConfig};
//!
//! let config = SyncConfig {
//!     table_name: "PlayerData".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//!
//! let store = MemoryStore::with_limits(config.limits);
//! # let _ = store;
//! ```

pub mod chunk;
mod config;
mod engine;
mod error;
mod executor;
mod fetcher;
mod memory;
mod report;
pub mod source;
pub mod store;

pub use chunk::{chunk_count, chunked};
pub use config::{
    BatchLimits, DEFAULT_FETCH_CONCURRENCY, DEFAULT_READ_LIMIT, DEFAULT_READ_PAUSE_MS,
    DEFAULT_WRITE_LIMIT, SyncConfig,
};
pub use engine::{Phase, ReconcilePlan, Reconciler, dedup_roster, plan};
pub use error::{SyncError, SyncResult};
pub use executor::{BatchExecutor, BatchKind, BatchOp, BatchOutcome, ReadOutcome, StageReport};
pub use fetcher::{BoundedFetcher, FetchFailure, FetchOutcome};
pub use memory::MemoryStore;
pub use report::SyncReport;
pub use source::RosterSource;
pub use store::{BatchStore, GetBatch, WriteRequest};
