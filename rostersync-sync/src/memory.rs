//! In-memory batch store.
//!
//! Holds one ordered map per table. Used for dry runs and as the reference
//! store in tests; it enforces provider limits and rejects duplicate keys
//! within one write batch the same way a hosted provider does.

use crate::config::BatchLimits;
use crate::error::{SyncError, SyncResult};
use crate::store::{BatchStore, GetBatch, WriteRequest};
use async_trait::async_trait;
use rostersync_types::RecordKey;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

type Table = BTreeMap<RecordKey, Value>;

/// A `BatchStore` backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
    limits: Option<BatchLimits>,
}

impl MemoryStore {
    /// Creates an empty store that accepts batches of any size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects batches above `limits`.
    pub fn with_limits(limits: BatchLimits) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            limits: Some(limits),
        }
    }

    /// Inserts an item directly, bypassing batch limits.
    pub async fn seed(&self, table: &str, item: Value) -> SyncResult<()> {
        let key = item_key(&item)?;
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .insert(key, item);
        Ok(())
    }

    /// Returns a copy of a table's content, ordered by key.
    pub async fn snapshot(&self, table: &str) -> BTreeMap<RecordKey, Value> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of items in a table.
    pub async fn len(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, Table::len)
    }

    /// Returns true if the table holds no items.
    pub async fn is_empty(&self, table: &str) -> bool {
        self.len(table).await == 0
    }

    fn check_write(&self, count: usize) -> SyncResult<()> {
        match self.limits {
            Some(limits) if count > limits.write.get() => Err(SyncError::Validation(format!(
                "write batch of {count} exceeds limit {}",
                limits.write
            ))),
            _ => Ok(()),
        }
    }

    fn check_read(&self, count: usize) -> SyncResult<()> {
        match self.limits {
            Some(limits) if count > limits.read.get() => Err(SyncError::Validation(format!(
                "read batch of {count} exceeds limit {}",
                limits.read
            ))),
            _ => Ok(()),
        }
    }
}

fn item_key(item: &Value) -> SyncResult<RecordKey> {
    serde_json::from_value(item.clone())
        .map_err(|e| SyncError::Validation(format!("item has no usable key: {e}")))
}

fn ensure_distinct<'a>(keys: impl Iterator<Item = &'a RecordKey>) -> SyncResult<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(SyncError::Validation(format!(
                "batch contains duplicate key {key}"
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl BatchStore for MemoryStore {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn put_batch(&self, table: &str, items: &[Value]) -> SyncResult<Vec<WriteRequest>> {
        self.check_write(items.len())?;
        let keyed = items
            .iter()
            .map(|item| Ok((item_key(item)?, item.clone())))
            .collect::<SyncResult<Vec<_>>>()?;
        ensure_distinct(keyed.iter().map(|(key, _)| key))?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        for (key, item) in keyed {
            rows.insert(key, item);
        }
        debug!("memory store: put {} items into {}", items.len(), table);
        Ok(Vec::new())
    }

    async fn delete_batch(
        &self,
        table: &str,
        keys: &[RecordKey],
    ) -> SyncResult<Vec<WriteRequest>> {
        self.check_write(keys.len())?;
        ensure_distinct(keys.iter())?;

        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(table) {
            for key in keys {
                rows.remove(key);
            }
        }
        debug!("memory store: deleted {} keys from {}", keys.len(), table);
        Ok(Vec::new())
    }

    async fn get_batch(&self, table: &str, keys: &[RecordKey]) -> SyncResult<GetBatch> {
        self.check_read(keys.len())?;
        ensure_distinct(keys.iter())?;

        let tables = self.tables.read().await;
        let items = match tables.get(table) {
            Some(rows) => keys.iter().filter_map(|k| rows.get(k).cloned()).collect(),
            None => Vec::new(),
        };
        Ok(GetBatch {
            items,
            unprocessed_keys: Vec::new(),
        })
    }
}
