//! Configuration for a reconciliation pass.
//!
//! Built once by the caller and passed into the reconciler; nothing in the
//! engine reads the environment.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Default provider limit for bulk writes (put and delete).
pub const DEFAULT_WRITE_LIMIT: NonZeroUsize = match NonZeroUsize::new(25) {
    Some(n) => n,
    None => unreachable!(),
};

/// Default provider limit for bulk reads.
pub const DEFAULT_READ_LIMIT: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(n) => n,
    None => unreachable!(),
};

/// Default number of concurrent detail fetches.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 3;

/// Default pause between consecutive read batches.
pub const DEFAULT_READ_PAUSE_MS: u64 = 200;

/// Maximum items per provider round trip, by operation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLimits {
    /// Limit for put and delete batches.
    pub write: NonZeroUsize,
    /// Limit for get batches.
    pub read: NonZeroUsize,
}

impl BatchLimits {
    /// Creates limits from raw sizes, rejecting zero.
    pub fn new(write: usize, read: usize) -> SyncResult<Self> {
        let write = NonZeroUsize::new(write)
            .ok_or_else(|| SyncError::Config("write batch limit must be at least 1".into()))?;
        let read = NonZeroUsize::new(read)
            .ok_or_else(|| SyncError::Config("read batch limit must be at least 1".into()))?;
        Ok(Self { write, read })
    }
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            write: DEFAULT_WRITE_LIMIT,
            read: DEFAULT_READ_LIMIT,
        }
    }
}

/// Configuration for the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Store table holding the detail records.
    pub table_name: String,
    /// Universe whose roster is synchronized.
    pub universe: u32,
    /// Maximum concurrent detail fetches.
    pub fetch_concurrency: usize,
    /// Provider batch limits.
    #[serde(default)]
    pub limits: BatchLimits,
    /// Pause between read batches (ms).
    #[serde(default = "default_read_pause_ms")]
    pub read_pause_ms: u64,
}

fn default_read_pause_ms() -> u64 {
    DEFAULT_READ_PAUSE_MS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            table_name: "PlayerData".to_string(),
            universe: 166,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            limits: BatchLimits::default(),
            read_pause_ms: DEFAULT_READ_PAUSE_MS,
        }
    }
}

impl SyncConfig {
    /// Checks the configuration before any side effect happens.
    pub fn validate(&self) -> SyncResult<()> {
        if self.table_name.trim().is_empty() {
            return Err(SyncError::Config("table name is empty".into()));
        }
        if self.fetch_concurrency == 0 {
            return Err(SyncError::Config(
                "fetch concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Returns the pause between read batches.
    pub fn read_pause(&self) -> Duration {
        Duration::from_millis(self.read_pause_ms)
    }
}
