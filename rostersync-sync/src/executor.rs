//! Batch executor: one provider round trip per chunk.
//!
//! Every chunk is attempted. Hard errors and unprocessed items are logged
//! and folded into a [`StageReport`]; nothing is retried here.

use crate::chunk::{chunk_count, chunked};
use crate::config::BatchLimits;
use crate::error::{SyncError, SyncResult};
use crate::store::{BatchStore, WriteRequest};
use rostersync_types::{DetailRecord, RecordKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Kind of provider round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchKind {
    Put,
    Delete,
    Get,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatchKind::Put => "put",
            BatchKind::Delete => "delete",
            BatchKind::Get => "get",
        })
    }
}

/// How a single round trip ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOutcome {
    /// Every item was processed.
    Success,
    /// The call succeeded but the provider handed back `count` items.
    Unprocessed { count: usize },
    /// The call failed; none of its items can be assumed written.
    Failed { error: String },
}

/// One provider round trip and its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOp {
    pub kind: BatchKind,
    /// Position of the chunk within its stage.
    pub index: usize,
    /// Number of items the chunk carried.
    pub size: usize,
    pub outcome: BatchOutcome,
}

/// Aggregate of all round trips of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub kind: BatchKind,
    pub batches: Vec<BatchOp>,
    /// Items handed to the store across all chunks.
    pub attempted: usize,
    /// Items carried by chunks that failed outright.
    pub failed_items: usize,
    /// Write items the provider declined.
    pub unprocessed: Vec<WriteRequest>,
    /// Read keys the provider declined.
    pub unprocessed_keys: Vec<RecordKey>,
}

impl StageReport {
    /// Creates an empty report for a stage.
    pub fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            batches: Vec::new(),
            attempted: 0,
            failed_items: 0,
            unprocessed: Vec::new(),
            unprocessed_keys: Vec::new(),
        }
    }

    fn record(&mut self, index: usize, size: usize, outcome: BatchOutcome) {
        self.attempted += size;
        if let BatchOutcome::Failed { .. } = outcome {
            self.failed_items += size;
        }
        self.batches.push(BatchOp {
            kind: self.kind,
            index,
            size,
            outcome,
        });
    }

    fn record_error(&mut self, index: usize, size: usize, error: &SyncError) {
        warn!(
            "{} batch {} ({} items) failed: {}",
            self.kind, index, size, error
        );
        self.record(
            index,
            size,
            BatchOutcome::Failed {
                error: error.to_string(),
            },
        );
    }

    /// Number of items the provider declined across all chunks.
    pub fn unprocessed_count(&self) -> usize {
        self.unprocessed.len() + self.unprocessed_keys.len()
    }

    /// Number of chunks that failed outright.
    pub fn failed_batches(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| matches!(b.outcome, BatchOutcome::Failed { .. }))
            .count()
    }

    /// Items the provider accepted.
    pub fn succeeded(&self) -> usize {
        self.attempted
            .saturating_sub(self.failed_items)
            .saturating_sub(self.unprocessed_count())
    }

    /// Returns true if every item of every chunk was processed.
    pub fn is_clean(&self) -> bool {
        self.failed_items == 0 && self.unprocessed_count() == 0
    }

    /// Turns a non-clean report into `SyncError::Incomplete`.
    pub fn ensure_complete(&self) -> SyncResult<()> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(SyncError::Incomplete {
                unprocessed: self.unprocessed_count(),
                failed: self.failed_items,
            })
        }
    }
}

/// Records returned by a read stage together with its report.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub records: Vec<DetailRecord>,
    pub report: StageReport,
}

/// Runs chunked bulk operations against one table of a [`BatchStore`].
pub struct BatchExecutor {
    store: Arc<dyn BatchStore>,
    table: String,
    limits: BatchLimits,
    read_pause: Duration,
}

impl BatchExecutor {
    /// Creates an executor for `table`.
    pub fn new(store: Arc<dyn BatchStore>, table: impl Into<String>, limits: BatchLimits) -> Self {
        Self {
            store,
            table: table.into(),
            limits,
            read_pause: Duration::ZERO,
        }
    }

    /// Sets the pause inserted between consecutive get batches.
    #[must_use]
    pub fn with_read_pause(mut self, pause: Duration) -> Self {
        self.read_pause = pause;
        self
    }

    /// Returns the table this executor writes to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the provider limits in use.
    pub fn limits(&self) -> BatchLimits {
        self.limits
    }

    /// Writes `records` in batches of at most the write limit.
    pub async fn put_many(&self, records: &[DetailRecord]) -> StageReport {
        let mut report = StageReport::new(BatchKind::Put);
        debug!(
            "put_many: {} records in {} batches",
            records.len(),
            chunk_count(records.len(), self.limits.write)
        );

        for (index, chunk) in chunked(records, self.limits.write).enumerate() {
            let items = match encode_items(chunk) {
                Ok(items) => items,
                Err(e) => {
                    report.record_error(index, chunk.len(), &e);
                    continue;
                }
            };

            match self.store.put_batch(&self.table, &items).await {
                Ok(unprocessed) => self.absorb_writes(&mut report, index, chunk.len(), unprocessed),
                Err(e) => report.record_error(index, chunk.len(), &e),
            }
        }

        info!(
            "put_many: {} attempted, {} unprocessed, {} failed",
            report.attempted,
            report.unprocessed_count(),
            report.failed_items
        );
        report
    }

    /// Deletes `keys` in batches of at most the write limit.
    pub async fn delete_many(&self, keys: &[RecordKey]) -> StageReport {
        let mut report = StageReport::new(BatchKind::Delete);
        debug!(
            "delete_many: {} keys in {} batches",
            keys.len(),
            chunk_count(keys.len(), self.limits.write)
        );

        for (index, chunk) in chunked(keys, self.limits.write).enumerate() {
            match self.store.delete_batch(&self.table, chunk).await {
                Ok(unprocessed) => self.absorb_writes(&mut report, index, chunk.len(), unprocessed),
                Err(e) => report.record_error(index, chunk.len(), &e),
            }
        }

        info!(
            "delete_many: {} attempted, {} unprocessed, {} failed",
            report.attempted,
            report.unprocessed_count(),
            report.failed_items
        );
        report
    }

    /// Reads `keys` in batches of at most the read limit and decodes the
    /// items found.
    pub async fn get_many(&self, keys: &[RecordKey]) -> ReadOutcome {
        let mut report = StageReport::new(BatchKind::Get);
        let mut records = Vec::new();
        debug!(
            "get_many: {} keys in {} batches",
            keys.len(),
            chunk_count(keys.len(), self.limits.read)
        );

        for (index, chunk) in chunked(keys, self.limits.read).enumerate() {
            if index > 0 && !self.read_pause.is_zero() {
                tokio::time::sleep(self.read_pause).await;
            }

            let batch = match self.store.get_batch(&self.table, chunk).await {
                Ok(batch) => batch,
                Err(e) => {
                    report.record_error(index, chunk.len(), &e);
                    continue;
                }
            };

            let decoded = match decode_items(batch.items) {
                Ok(decoded) => decoded,
                Err(e) => {
                    report.record_error(index, chunk.len(), &e);
                    continue;
                }
            };

            records.extend(decoded);
            if batch.unprocessed_keys.is_empty() {
                report.record(index, chunk.len(), BatchOutcome::Success);
            } else {
                let count = batch.unprocessed_keys.len();
                warn!("get batch {} left {} keys unprocessed", index, count);
                report.unprocessed_keys.extend(batch.unprocessed_keys);
                report.record(index, chunk.len(), BatchOutcome::Unprocessed { count });
            }
        }

        info!(
            "get_many: {} keys read, {} records found, {} unprocessed, {} failed",
            report.attempted,
            records.len(),
            report.unprocessed_count(),
            report.failed_items
        );
        ReadOutcome { records, report }
    }

    fn absorb_writes(
        &self,
        report: &mut StageReport,
        index: usize,
        size: usize,
        unprocessed: Vec<WriteRequest>,
    ) {
        if unprocessed.is_empty() {
            report.record(index, size, BatchOutcome::Success);
            return;
        }
        let count = unprocessed.len();
        warn!(
            "{} batch {} on {} left {} of {} items unprocessed",
            report.kind, index, self.table, count, size
        );
        report.unprocessed.extend(unprocessed);
        report.record(index, size, BatchOutcome::Unprocessed { count });
    }
}

fn encode_items(records: &[DetailRecord]) -> SyncResult<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(SyncError::from))
        .collect()
}

fn decode_items(items: Vec<Value>) -> SyncResult<Vec<DetailRecord>> {
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|e| SyncError::Decode(format!("detail record: {e}")))
        })
        .collect()
}
