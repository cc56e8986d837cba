//! Poll scheduler
//!
//! Drives the fetch → decode → reconcile cycle on a fixed interval.
//!
//! Lifecycle is an explicit two-state machine:
//! - `Idle` → `start()` → `Running`: spawns a cancellable timer task
//! - `Running` → `stop()` → `Idle`: cancels the timer; a cycle already in
//!   flight runs to completion
//!
//! Cycles are serialized: every cycle (timer tick or `poll_once`) must take
//! the same cycle guard, and a tick that finds it held is skipped rather
//! than queued.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use feed_types::errors::MappingError;
use feed_types::event::Event;

use crate::decoder::{self, LineFailure};
use crate::mappings;
use crate::metrics::FeedMetrics;
use crate::providers::{MappingProvider, ProviderError, StateProvider};
use crate::reconciler::{EventChange, ReconcileReport};
use crate::store::SnapshotStore;

/// Why a poll cycle did not reach reconciliation. The store is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("a poll cycle is already in flight")]
    Busy,

    #[error("mapping fetch failed: {0}")]
    Mapping(ProviderError),

    #[error("state fetch failed: {0}")]
    State(ProviderError),
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between poll cycles. The first cycle fires one interval after
    /// `start()`.
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Outcome of one completed poll cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Problems in the mapping payload. Valid pairs were still applied.
    pub mapping_errors: Vec<MappingError>,
    /// Event lines dropped by the decoder.
    pub line_failures: Vec<LineFailure>,
    /// Event lines that decoded successfully.
    pub events_decoded: usize,
    pub reconcile: ReconcileReport,
    pub duration: Duration,
}

enum SchedulerState {
    Idle,
    Running { cancel: CancellationToken },
}

/// Periodic driver for the poll cycle.
pub struct Scheduler {
    poller: Arc<Poller>,
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
}

impl Scheduler {
    pub fn new(
        mapping_provider: Arc<dyn MappingProvider>,
        state_provider: Arc<dyn StateProvider>,
        store: SnapshotStore,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            poller: Arc::new(Poller {
                mapping_provider,
                state_provider,
                store,
                metrics: Arc::new(FeedMetrics::new()),
                cycle: tokio::sync::Mutex::new(()),
            }),
            config,
            state: Mutex::new(SchedulerState::Idle),
        }
    }

    /// Scheduler over a fresh store with the default interval.
    pub fn with_defaults(
        mapping_provider: Arc<dyn MappingProvider>,
        state_provider: Arc<dyn StateProvider>,
    ) -> Self {
        Self::new(
            mapping_provider,
            state_provider,
            SnapshotStore::new(),
            SchedulerConfig::default(),
        )
    }

    /// Begin polling. No-op if already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut state = self.lock_state();
        if matches!(*state, SchedulerState::Running { .. }) {
            debug!("Scheduler already running");
            return;
        }

        let cancel = CancellationToken::new();
        tokio::spawn(run_timer(
            Arc::clone(&self.poller),
            self.config.interval,
            cancel.clone(),
        ));
        *state = SchedulerState::Running { cancel };

        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            "Scheduler started"
        );
    }

    /// Stop scheduling further cycles. No-op if idle.
    pub fn stop(&self) {
        let mut state = self.lock_state();
        match std::mem::replace(&mut *state, SchedulerState::Idle) {
            SchedulerState::Running { cancel } => {
                cancel.cancel();
                info!("Scheduler stopped");
            }
            SchedulerState::Idle => debug!("Scheduler already idle"),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lock_state(), SchedulerState::Running { .. })
    }

    /// Run one cycle now, outside the timer.
    ///
    /// Returns `PollError::Busy` if another cycle holds the guard.
    pub async fn poll_once(&self) -> Result<CycleReport, PollError> {
        self.poller.poll().await
    }

    /// Current events, tombstones excluded, sorted by identifier.
    pub fn current_state(&self) -> Vec<Event> {
        self.poller.store.current_events()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.poller.store
    }

    pub fn metrics(&self) -> Arc<FeedMetrics> {
        Arc::clone(&self.poller.metrics)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let SchedulerState::Running { cancel } = &*self.lock_state() {
            cancel.cancel();
        }
    }
}

async fn run_timer(poller: Arc<Poller>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                // Each cycle runs detached so cancellation never interrupts it
                // and the timer keeps its cadence while a slow cycle runs.
                let poller = Arc::clone(&poller);
                tokio::spawn(async move {
                    // Outcome is logged and counted inside `poll`.
                    let _ = poller.poll().await;
                });
            }
        }
    }

    debug!("Poll timer exited");
}

struct Poller {
    mapping_provider: Arc<dyn MappingProvider>,
    state_provider: Arc<dyn StateProvider>,
    store: SnapshotStore,
    metrics: Arc<FeedMetrics>,
    /// Held for the whole of a cycle.
    cycle: tokio::sync::Mutex<()>,
}

impl Poller {
    async fn poll(&self) -> Result<CycleReport, PollError> {
        let Ok(_guard) = self.cycle.try_lock() else {
            self.metrics.record_cycle_skipped();
            warn!("Previous poll cycle still in flight, skipping");
            return Err(PollError::Busy);
        };

        match self.run_cycle().await {
            Ok(report) => {
                self.metrics.record_cycle(
                    report.duration.as_micros() as u64,
                    report.mapping_errors.len(),
                    report.events_decoded,
                    report.line_failures.len(),
                    &report.reconcile,
                );
                info!(
                    decoded = report.events_decoded,
                    rejected = report.line_failures.len(),
                    mapping_errors = report.mapping_errors.len(),
                    added = report.reconcile.added(),
                    changed = report.reconcile.changed(),
                    removed = report.reconcile.removed(),
                    unchanged = report.reconcile.unchanged,
                    duration_ms = report.duration.as_millis() as u64,
                    "Poll cycle complete"
                );
                Ok(report)
            }
            Err(err) => {
                self.metrics.record_cycle_failed();
                warn!(error = %err, "Poll cycle aborted, keeping last snapshot");
                Err(err)
            }
        }
    }

    async fn run_cycle(&self) -> Result<CycleReport, PollError> {
        let started = Instant::now();

        // Both fetches settle before either result is inspected.
        let (raw_mappings, raw_state) = tokio::join!(
            self.mapping_provider.fetch_mappings(),
            self.state_provider.fetch_state(),
        );
        let raw_mappings = raw_mappings.map_err(PollError::Mapping)?;
        let raw_state = raw_state.map_err(PollError::State)?;

        let mapping = mappings::decode_mappings(&raw_mappings);
        for err in &mapping.errors {
            if err.is_warning() {
                warn!(error = %err, "Mapping payload warning");
            } else {
                error!(error = %err, "Skipping malformed mapping pair");
            }
        }
        debug!(entries = mapping.table.len(), "Mapping table decoded");

        let batch = decoder::decode_event_payload(&raw_state, &mapping.table);
        for failure in &batch.failures {
            warn!(
                line_number = failure.line_number,
                error_kind = failure.error.kind(),
                error = %failure.error,
                "Dropping event line"
            );
        }

        let events_decoded = batch.events.len();
        let reconcile = self.store.reconcile(batch.events);
        for change in &reconcile.changes {
            log_change(change);
        }
        debug!(unchanged = reconcile.unchanged, "Unchanged events");

        Ok(CycleReport {
            mapping_errors: mapping.errors,
            line_failures: batch.failures,
            events_decoded,
            reconcile,
            duration: started.elapsed(),
        })
    }
}

fn log_change(change: &EventChange) {
    match change {
        EventChange::Added { id } => info!(event_id = %id, "Event added"),
        EventChange::Changed { id, status, scores } => info!(
            event_id = %id,
            status_before = status.as_ref().map(|c| c.before.as_str()),
            status_after = status.as_ref().map(|c| c.after.as_str()),
            scores_before = ?scores.as_ref().map(|c| &c.before),
            scores_after = ?scores.as_ref().map(|c| &c.after),
            "Event changed"
        ),
        EventChange::Removed {
            id,
            previous_status,
        } => info!(
            event_id = %id,
            previous_status = previous_status.as_str(),
            "Event removed"
        ),
    }
}
