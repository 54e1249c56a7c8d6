//! Batch store abstraction trait.
//!
//! Defines the single-round-trip interface a key-value provider exposes.
//! Chunking to the provider's limits happens in the executor, so
//! implementations may assume every call is already within bounds.

use crate::error::SyncResult;
use async_trait::async_trait;
use rostersync_types::RecordKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One write item a provider declined to process in a batch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WriteRequest {
    /// A put of the given item.
    Put(Value),
    /// A delete of the given key.
    Delete(RecordKey),
}

impl WriteRequest {
    /// Returns the key this request targets, if it can be determined.
    pub fn key(&self) -> Option<RecordKey> {
        match self {
            WriteRequest::Put(item) => serde_json::from_value(item.clone()).ok(),
            WriteRequest::Delete(key) => Some(key.clone()),
        }
    }
}

/// Response of a single get round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetBatch {
    /// Items found, in whatever order the provider returned them.
    pub items: Vec<Value>,
    /// Keys the provider declined to read in this round.
    pub unprocessed_keys: Vec<RecordKey>,
}

/// Abstract batch-capable key-value store.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Returns the name of the store provider.
    fn provider_name(&self) -> &'static str;

    /// Writes a batch of items, returning the ones left unprocessed.
    async fn put_batch(&self, table: &str, items: &[Value]) -> SyncResult<Vec<WriteRequest>>;

    /// Deletes a batch of keys, returning the ones left unprocessed.
    async fn delete_batch(&self, table: &str, keys: &[RecordKey])
        -> SyncResult<Vec<WriteRequest>>;

    /// Reads a batch of keys. Missing keys are simply absent from the result.
    async fn get_batch(&self, table: &str, keys: &[RecordKey]) -> SyncResult<GetBatch>;
}
