//! Remote roster source abstraction.

use crate::error::SyncResult;
use async_trait::async_trait;
use rostersync_types::{DetailRecord, Entity};

/// Where rosters and per-entity detail records come from.
///
/// Implementations own URL construction and payload parsing; the engine
/// only sees parsed records.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Returns the name of the source.
    fn source_name(&self) -> &'static str;

    /// Loads the full roster of a universe.
    async fn roster(&self, universe: u32) -> SyncResult<Vec<Entity>>;

    /// Loads the detail record of one roster entry.
    ///
    /// The identity fields of the returned record need not match `entity`;
    /// the fetcher overwrites them.
    async fn detail(&self, universe: u32, entity: &Entity) -> SyncResult<DetailRecord>;
}
