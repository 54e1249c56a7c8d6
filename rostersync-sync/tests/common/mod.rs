//! Shared test doubles for the sync engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use rostersync_sync::{
    BatchKind, BatchStore, GetBatch, MemoryStore, RosterSource, SyncError, SyncResult,
    WriteRequest,
};
use rostersync_types::{DetailRecord, Entity, Position, RecordKey, ScoreCategory};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const TABLE: &str = "PlayerData";

pub fn entity(n: usize) -> Entity {
    Entity::new(format!("{}", 100_000 + n), format!("player{n}"))
}

pub fn roster(n: usize) -> Vec<Entity> {
    (0..n).map(entity).collect()
}

/// Detail record as the remote source would return it for `entity`, with a
/// score derived from `generation` so passes can be told apart.
pub fn detail_for(entity: &Entity, generation: i64) -> DetailRecord {
    DetailRecord {
        id: entity.id.clone(),
        username: entity.name.clone(),
        server_id: Some("en166".into()),
        timestamp: 1_700_000_000 + generation,
        positions: vec![Position {
            category: ScoreCategory::Total,
            score: generation * 1_000,
            ranking: 1,
            ships: None,
        }],
        planet_count: 1,
        alliance_id: None,
    }
}

// ── Source ──────────────────────────────────────────────────────

/// Roster source that tracks how many detail calls run at once.
pub struct MockSource {
    roster: Vec<Entity>,
    failing: HashSet<String>,
    delay: Duration,
    generation: i64,
    roster_error: bool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(roster: Vec<Entity>) -> Self {
        Self {
            roster,
            failing: HashSet::new(),
            delay: Duration::ZERO,
            generation: 1,
            roster_error: false,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.failing.extend(ids);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_generation(mut self, generation: i64) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_roster_error(mut self) -> Self {
        self.roster_error = true;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterSource for MockSource {
    fn source_name(&self) -> &'static str {
        "mock"
    }

    async fn roster(&self, _universe: u32) -> SyncResult<Vec<Entity>> {
        if self.roster_error {
            return Err(SyncError::Network("roster endpoint unreachable".into()));
        }
        Ok(self.roster.clone())
    }

    async fn detail(&self, _universe: u32, entity: &Entity) -> SyncResult<DetailRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&entity.id) {
            return Err(SyncError::Network(format!("HTTP 500 for {}", entity.id)));
        }
        // The payload carries a different identity; the fetcher must fix it.
        Ok(DetailRecord {
            id: "payload-id".into(),
            username: "payload-name".into(),
            ..detail_for(entity, self.generation)
        })
    }
}

// ── Store ───────────────────────────────────────────────────────

/// What a scripted store does on a given call.
#[derive(Debug, Clone)]
pub enum Fault {
    /// Hand back the last `n` items of the batch as unprocessed.
    Unprocessed(usize),
    /// Fail the round trip.
    Transport,
    /// Return an item that does not decode as a detail record (get only).
    Garbage,
}

/// Wraps a `MemoryStore`, recording every call and injecting faults by
/// `(kind, call index)`.
pub struct ScriptedStore {
    pub inner: MemoryStore,
    faults: HashMap<(BatchKind, usize), Fault>,
    calls: Mutex<Vec<(BatchKind, usize)>>,
}

impl ScriptedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            faults: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fault(mut self, kind: BatchKind, call: usize, fault: Fault) -> Self {
        self.faults.insert((kind, call), fault);
        self
    }

    /// Sizes of every call of `kind`, in call order.
    pub fn sizes(&self, kind: BatchKind) -> Vec<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, size)| *size)
            .collect()
    }

    fn begin(&self, kind: BatchKind, size: usize) -> Option<Fault> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.iter().filter(|(k, _)| *k == kind).count();
        calls.push((kind, size));
        self.faults.get(&(kind, index)).cloned()
    }
}

#[async_trait]
impl BatchStore for ScriptedStore {
    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    async fn put_batch(&self, table: &str, items: &[Value]) -> SyncResult<Vec<WriteRequest>> {
        match self.begin(BatchKind::Put, items.len()) {
            Some(Fault::Transport) => Err(SyncError::Transport("throttled".into())),
            Some(Fault::Unprocessed(n)) => {
                let split = items.len().saturating_sub(n);
                self.inner.put_batch(table, &items[..split]).await?;
                Ok(items[split..].iter().cloned().map(WriteRequest::Put).collect())
            }
            _ => self.inner.put_batch(table, items).await,
        }
    }

    async fn delete_batch(
        &self,
        table: &str,
        keys: &[RecordKey],
    ) -> SyncResult<Vec<WriteRequest>> {
        match self.begin(BatchKind::Delete, keys.len()) {
            Some(Fault::Transport) => Err(SyncError::Transport("throttled".into())),
            Some(Fault::Unprocessed(n)) => {
                let split = keys.len().saturating_sub(n);
                self.inner.delete_batch(table, &keys[..split]).await?;
                Ok(keys[split..].iter().cloned().map(WriteRequest::Delete).collect())
            }
            _ => self.inner.delete_batch(table, keys).await,
        }
    }

    async fn get_batch(&self, table: &str, keys: &[RecordKey]) -> SyncResult<GetBatch> {
        match self.begin(BatchKind::Get, keys.len()) {
            Some(Fault::Transport) => Err(SyncError::Transport("connection reset".into())),
            Some(Fault::Garbage) => {
                let mut batch = self.inner.get_batch(table, keys).await?;
                batch.items.push(serde_json::json!({"ID": 42}));
                Ok(batch)
            }
            Some(Fault::Unprocessed(n)) => {
                let split = keys.len().saturating_sub(n);
                let mut batch = self.inner.get_batch(table, &keys[..split]).await?;
                batch.unprocessed_keys = keys[split..].to_vec();
                Ok(batch)
            }
            None => self.inner.get_batch(table, keys).await,
        }
    }
}

/// Seeds `store` with one record per entity.
pub async fn seed(store: &MemoryStore, entities: &[Entity], generation: i64) {
    for e in entities {
        store
            .seed(TABLE, serde_json::to_value(detail_for(e, generation)).unwrap())
            .await
            .unwrap();
    }
}
