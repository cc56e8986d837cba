//! Observability counters for the poll cycle
//!
//! Tracks cycle outcomes, decode failures and reconcile changes for
//! Prometheus-style exposition. All counters are cumulative since start.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::reconciler::ReconcileReport;

/// Core metrics for the feed synchronizer.
pub struct FeedMetrics {
    // Cycles
    pub cycles_completed: AtomicU64,
    pub cycles_failed: AtomicU64,
    pub cycles_skipped: AtomicU64,
    pub cycle_duration_us: Mutex<LatencyTracker>,

    // Decoding
    pub lines_decoded: AtomicU64,
    pub lines_rejected: AtomicU64,
    pub mapping_errors: AtomicU64,

    // Reconciliation
    pub events_added: AtomicU64,
    pub events_changed: AtomicU64,
    pub events_removed: AtomicU64,
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self {
            cycles_completed: AtomicU64::new(0),
            cycles_failed: AtomicU64::new(0),
            cycles_skipped: AtomicU64::new(0),
            cycle_duration_us: Mutex::new(LatencyTracker::new(1000)),
            lines_decoded: AtomicU64::new(0),
            lines_rejected: AtomicU64::new(0),
            mapping_errors: AtomicU64::new(0),
            events_added: AtomicU64::new(0),
            events_changed: AtomicU64::new(0),
            events_removed: AtomicU64::new(0),
        }
    }

    /// Record a completed cycle and its decode/reconcile totals.
    pub fn record_cycle(
        &self,
        duration_us: u64,
        mapping_errors: usize,
        lines_decoded: usize,
        lines_rejected: usize,
        report: &ReconcileReport,
    ) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        self.mapping_errors.fetch_add(mapping_errors as u64, Ordering::Relaxed);
        self.lines_decoded.fetch_add(lines_decoded as u64, Ordering::Relaxed);
        self.lines_rejected.fetch_add(lines_rejected as u64, Ordering::Relaxed);
        self.events_added.fetch_add(report.added() as u64, Ordering::Relaxed);
        self.events_changed.fetch_add(report.changed() as u64, Ordering::Relaxed);
        self.events_removed.fetch_add(report.removed() as u64, Ordering::Relaxed);
        if let Ok(mut tracker) = self.cycle_duration_us.lock() {
            tracker.record(duration_us);
        }
    }

    /// Record a cycle aborted by a provider failure.
    pub fn record_cycle_failed(&self) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a tick skipped because a cycle was still in flight.
    pub fn record_cycle_skipped(&self) {
        self.cycles_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics as a BTreeMap for Prometheus-style exposition.
    pub fn export(&self) -> BTreeMap<String, u64> {
        let mut m = BTreeMap::new();
        m.insert("cycles_completed".to_string(), self.cycles_completed.load(Ordering::Relaxed));
        m.insert("cycles_failed".to_string(), self.cycles_failed.load(Ordering::Relaxed));
        m.insert("cycles_skipped".to_string(), self.cycles_skipped.load(Ordering::Relaxed));
        m.insert("lines_decoded".to_string(), self.lines_decoded.load(Ordering::Relaxed));
        m.insert("lines_rejected".to_string(), self.lines_rejected.load(Ordering::Relaxed));
        m.insert("mapping_errors".to_string(), self.mapping_errors.load(Ordering::Relaxed));
        m.insert("events_added".to_string(), self.events_added.load(Ordering::Relaxed));
        m.insert("events_changed".to_string(), self.events_changed.load(Ordering::Relaxed));
        m.insert("events_removed".to_string(), self.events_removed.load(Ordering::Relaxed));
        if let Ok(tracker) = self.cycle_duration_us.lock() {
            if let Some(p99) = tracker.percentile(99) {
                m.insert("cycle_duration_p99_us".to_string(), p99);
            }
        }
        m
    }
}

impl Default for FeedMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Sliding window of cycle durations, oldest evicted first.
pub struct LatencyTracker {
    window: VecDeque<u64>,
    capacity: usize,
}

impl LatencyTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, value: u64) {
        if self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);
    }

    /// Nearest-rank percentile (0-100) over the current window.
    pub fn percentile(&self, p: usize) -> Option<u64> {
        let mut sorted: Vec<u64> = self.window.iter().copied().collect();
        sorted.sort_unstable();
        let last = sorted.len().checked_sub(1)?;
        let rank = (p.min(100) * last + 50) / 100;
        sorted.get(rank).copied()
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }
}
