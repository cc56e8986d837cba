//! Snapshot store
//!
//! Process-held map from event identifier to current `Event`. Written only
//! by reconciliation, read by any number of concurrent queries.
//!
//! A whole reconcile pass, including the final tombstone scan, runs under
//! one write guard, so readers see either the previous snapshot or the
//! next one and never a partial batch. Reads return owned copies.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use feed_types::event::Event;
use feed_types::ids::EventId;

use crate::reconciler::{self, ReconcileReport};

#[derive(Debug, Default)]
struct StoreState {
    events: HashMap<EventId, Event>,
    /// Bumped by every reconcile that mutated `events`.
    version: u64,
}

/// Shared handle to the event snapshot. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<StoreState>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile a decoded batch into the store.
    pub fn reconcile(&self, batch: Vec<Event>) -> ReconcileReport {
        let mut state = self.write();
        let report = reconciler::reconcile(&mut state.events, batch);
        if !report.is_empty() {
            state.version += 1;
        }
        report
    }

    /// All events not tombstoned, sorted by identifier.
    pub fn current_events(&self) -> Vec<Event> {
        let state = self.read();
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|event| !event.is_removed())
            .cloned()
            .collect();
        events.sort_by(|a, b| a.id.cmp(&b.id));
        events
    }

    /// Stored event for `id`, tombstones included.
    pub fn get(&self, id: &str) -> Option<Event> {
        self.read().events.get(id).cloned()
    }

    /// Number of stored events, tombstones included.
    pub fn len(&self) -> usize {
        self.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().events.is_empty()
    }

    pub fn tombstone_count(&self) -> usize {
        self.read().events.values().filter(|e| e.is_removed()).count()
    }

    /// Current snapshot version.
    pub fn version(&self) -> u64 {
        self.read().version
    }

    // A poisoned guard still holds a whole snapshot.
    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
