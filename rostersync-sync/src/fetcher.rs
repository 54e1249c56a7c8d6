//! Bounded-concurrency detail fetcher.
//!
//! At most `concurrency` detail requests are in flight at any time. A
//! failing entity is logged and left out of the output; it never cancels
//! the other fetches. The call returns only after every attempt finished.

use crate::error::SyncError;
use crate::source::RosterSource;
use rostersync_types::{DetailRecord, Entity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// A roster entry whose detail record could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub entity_id: String,
    pub error: String,
}

/// Result of fetching a whole roster.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Fetched records, in roster order.
    pub records: Vec<DetailRecord>,
    /// Entities that were excluded, in roster order.
    pub failures: Vec<FetchFailure>,
}

/// Fetches detail records with a fixed cap on concurrent requests.
pub struct BoundedFetcher {
    source: Arc<dyn RosterSource>,
    concurrency: usize,
}

impl BoundedFetcher {
    /// Creates a fetcher. A cap of zero is raised to one.
    pub fn new(source: Arc<dyn RosterSource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Returns the concurrency cap.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches one detail record per entity.
    ///
    /// Every task writes into the slot of its input index, so the output
    /// keeps roster order even though completion order is arbitrary.
    pub async fn fetch_all(&self, universe: u32, entities: &[Entity]) -> FetchOutcome {
        if entities.is_empty() {
            return FetchOutcome::default();
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut task_index = HashMap::with_capacity(entities.len());

        for (index, entity) in entities.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let handle = tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => source
                        .detail(universe, &entity)
                        .await
                        .map(|record| record.with_identity(&entity)),
                    Err(_) => Err(SyncError::Task("fetch semaphore closed".into())),
                };
                (index, result)
            });
            task_index.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<Result<DetailRecord, SyncError>>> =
            (0..entities.len()).map(|_| None).collect();

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (index, result))) => slots[index] = Some(result),
                Err(e) => {
                    if let Some(&index) = task_index.get(&e.id()) {
                        slots[index] = Some(Err(SyncError::Task(e.to_string())));
                    }
                }
            }
        }

        let mut outcome = FetchOutcome {
            records: Vec::with_capacity(entities.len()),
            failures: Vec::new(),
        };

        for (entity, slot) in entities.iter().zip(slots) {
            match slot {
                Some(Ok(record)) => {
                    debug!("Fetched detail for {}", entity.id);
                    outcome.records.push(record);
                }
                Some(Err(e)) => {
                    warn!(
                        "Unable to retrieve data for {} in universe {}: {}",
                        entity.id, universe, e
                    );
                    outcome.failures.push(FetchFailure {
                        entity_id: entity.id.clone(),
                        error: e.to_string(),
                    });
                }
                None => {
                    warn!("Fetch task for {} never reported", entity.id);
                    outcome.failures.push(FetchFailure {
                        entity_id: entity.id.clone(),
                        error: "fetch task did not report".into(),
                    });
                }
            }
        }

        info!(
            "Fetched {}/{} detail records ({} failed)",
            outcome.records.len(),
            entities.len(),
            outcome.failures.len()
        );
        outcome
    }
}
