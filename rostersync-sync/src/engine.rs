//! Reconciler: drives one pass from roster to fresh snapshot.
//!
//! The store's bulk API has put and delete but no update, so a pass deletes
//! every known record already present and re-inserts freshly fetched ones:
//!
//! `Start → ReadExisting → Diff → Delete → FetchFresh → Insert → Done`
//!
//! Chunk- and entity-scoped failures are collected in the [`SyncReport`];
//! only configuration and roster errors abort a pass, and both happen
//! before the first write.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::executor::BatchExecutor;
use crate::fetcher::BoundedFetcher;
use crate::report::SyncReport;
use crate::source::RosterSource;
use crate::store::BatchStore;
use rostersync_types::{DetailRecord, Entity, RecordKey};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// States of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    ReadExisting,
    Diff,
    Delete,
    FetchFresh,
    Insert,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Start => "start",
            Phase::ReadExisting => "read-existing",
            Phase::Diff => "diff",
            Phase::Delete => "delete",
            Phase::FetchFresh => "fetch-fresh",
            Phase::Insert => "insert",
            Phase::Done => "done",
        })
    }
}

/// Output of the diff phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Every known key, in roster order. All of them get refreshed.
    pub all_keys: Vec<RecordKey>,
    /// Keys already in the store. All of them get purged first.
    pub stale_keys: Vec<RecordKey>,
}

/// Computes the delete and refresh sets of a pass.
///
/// Stale keys are de-duplicated and restricted to the known universe, so
/// `stale_keys ⊆ all_keys` holds whatever the store returned.
pub fn plan(known: &[Entity], existing: &[DetailRecord]) -> ReconcilePlan {
    let mut seen = HashSet::with_capacity(known.len());
    let all_keys: Vec<RecordKey> = known
        .iter()
        .map(Entity::key)
        .filter(|key| seen.insert(key.clone()))
        .collect();

    let mut stale = HashSet::with_capacity(existing.len());
    let stale_keys = existing
        .iter()
        .map(DetailRecord::key)
        .filter(|key| seen.contains(key) && stale.insert(key.clone()))
        .collect();

    ReconcilePlan {
        all_keys,
        stale_keys,
    }
}

/// Drops roster entries whose ID was already seen, keeping the first.
pub fn dedup_roster(entities: Vec<Entity>) -> Vec<Entity> {
    let total = entities.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<Entity> = entities
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect();
    if unique.len() < total {
        warn!("Dropped {} duplicate roster entries", total - unique.len());
    }
    unique
}

/// Reconciles one universe's roster against one store table.
pub struct Reconciler {
    source: Arc<dyn RosterSource>,
    config: SyncConfig,
    executor: BatchExecutor,
    fetcher: BoundedFetcher,
}

impl Reconciler {
    /// Creates a reconciler, validating `config` first.
    pub fn new(
        source: Arc<dyn RosterSource>,
        store: Arc<dyn BatchStore>,
        config: SyncConfig,
    ) -> SyncResult<Self> {
        config.validate()?;
        let executor = BatchExecutor::new(store, config.table_name.clone(), config.limits)
            .with_read_pause(config.read_pause());
        let fetcher = BoundedFetcher::new(Arc::clone(&source), config.fetch_concurrency);
        Ok(Self {
            source,
            config,
            executor,
            fetcher,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Runs a full pass: loads the roster, then reconciles it.
    pub async fn run(&self) -> SyncResult<SyncReport> {
        let started = Instant::now();
        enter(Phase::Start);
        info!(
            "Loading roster of universe {} from {}",
            self.config.universe,
            self.source.source_name()
        );
        let roster = self
            .source
            .roster(self.config.universe)
            .await
            .map_err(|e| match e {
                SyncError::Config(_) | SyncError::Roster(_) => e,
                other => SyncError::Roster(other.to_string()),
            })?;
        info!(
            "Loaded {} roster entries from universe {}",
            roster.len(),
            self.config.universe
        );

        let mut report = self.reconcile(&roster).await;
        report.elapsed = started.elapsed();
        Ok(report)
    }

    /// Reconciles an already-loaded roster against the store.
    pub async fn reconcile(&self, roster: &[Entity]) -> SyncReport {
        let started = Instant::now();
        let known = dedup_roster(roster.to_vec());
        let keys: Vec<RecordKey> = known.iter().map(Entity::key).collect();

        enter(Phase::ReadExisting);
        let existing = self.executor.get_many(&keys).await;
        info!(
            "Found {} of {} known records in {}",
            existing.records.len(),
            keys.len(),
            self.executor.table()
        );

        enter(Phase::Diff);
        let plan = plan(&known, &existing.records);
        debug!(
            "Plan: {} stale keys to purge, {} keys to refresh",
            plan.stale_keys.len(),
            plan.all_keys.len()
        );

        enter(Phase::Delete);
        let delete = self.executor.delete_many(&plan.stale_keys).await;

        enter(Phase::FetchFresh);
        let fetched = self.fetcher.fetch_all(self.config.universe, &known).await;

        enter(Phase::Insert);
        let insert = self.executor.put_many(&fetched.records).await;

        enter(Phase::Done);
        let report = SyncReport {
            table: self.config.table_name.clone(),
            universe: self.config.universe,
            known: known.len(),
            existing: plan.stale_keys.len(),
            read: existing.report,
            delete,
            fetched: fetched.records.len(),
            fetch_failures: fetched.failures,
            insert,
            elapsed: started.elapsed(),
        };
        info!("Pass finished: {}", report);
        report
    }
}

fn enter(phase: Phase) {
    debug!("reconcile phase: {}", phase);
}
