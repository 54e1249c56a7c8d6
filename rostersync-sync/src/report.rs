//! Summary of one reconciliation pass.

use crate::error::{SyncError, SyncResult};
use crate::executor::StageReport;
use crate::fetcher::FetchFailure;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Everything a caller needs to log a pass and decide its exit status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub table: String,
    pub universe: u32,
    /// Distinct roster entries in the universe.
    pub known: usize,
    /// Records found in the store before the pass.
    pub existing: usize,
    pub read: StageReport,
    pub delete: StageReport,
    /// Detail records fetched from the source.
    pub fetched: usize,
    pub fetch_failures: Vec<FetchFailure>,
    pub insert: StageReport,
    pub elapsed: Duration,
}

impl SyncReport {
    /// Rows the store confirmed deleted.
    pub fn deleted_count(&self) -> usize {
        self.delete.succeeded()
    }

    /// Rows the store confirmed written.
    pub fn inserted_count(&self) -> usize {
        self.insert.succeeded()
    }

    /// Write items the store declined in the delete and insert stages.
    pub fn unprocessed_count(&self) -> usize {
        self.delete.unprocessed_count() + self.insert.unprocessed_count()
    }

    /// Write items lost to failed chunks in the delete and insert stages.
    pub fn failed_count(&self) -> usize {
        self.delete.failed_items + self.insert.failed_items
    }

    /// Read keys that could not be checked against the store.
    pub fn unread_count(&self) -> usize {
        self.read.failed_items + self.read.unprocessed_count()
    }

    /// Returns true if every delete and insert item was processed.
    pub fn is_complete(&self) -> bool {
        self.unprocessed_count() == 0 && self.failed_count() == 0
    }

    /// Returns `SyncError::Incomplete` with the outstanding counts when any
    /// write was left unprocessed or failed.
    pub fn ensure_complete(&self) -> SyncResult<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(SyncError::Incomplete {
                unprocessed: self.unprocessed_count(),
                failed: self.failed_count(),
            })
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "universe {} -> {}: {} known, {} deleted, {} inserted, {} unprocessed, {} failed, {} fetch failures in {:.2?}",
            self.universe,
            self.table,
            self.known,
            self.deleted_count(),
            self.inserted_count(),
            self.unprocessed_count(),
            self.failed_count(),
            self.fetch_failures.len(),
            self.elapsed
        )
    }
}
