//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use serde::Serialize;

/// Counters for the dispatch core
///
/// Each increment also feeds the `metrics` facade, so an installed exporter
/// (Prometheus via the observability crate) sees the same counts.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Events accepted by post_event
    posted: AtomicU64,
    /// Events delivered on first attempt
    delivered: AtomicU64,
    /// Events parked in the retry cache
    cached: AtomicU64,
    /// Cached events delivered by a retry round
    retried: AtomicU64,
    /// Events lost because the retry cache rejected them
    lost: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted post
    pub fn inc_posted(&self) {
        self.posted.fetch_add(1, Ordering::Relaxed);
        counter!("telemeter_events_posted_total").increment(1);
    }

    /// Record a first-attempt delivery
    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        counter!("telemeter_events_delivered_total").increment(1);
    }

    /// Record an event parked for retry
    pub fn inc_cached(&self) {
        self.cached.fetch_add(1, Ordering::Relaxed);
        counter!("telemeter_events_cached_total").increment(1);
    }

    /// Record a successful re-delivery
    pub fn inc_retried(&self) {
        self.retried.fetch_add(1, Ordering::Relaxed);
        counter!("telemeter_events_retried_total").increment(1);
    }

    /// Record an event lost at the cache boundary
    pub fn inc_lost(&self) {
        self.lost.fetch_add(1, Ordering::Relaxed);
        counter!("telemeter_events_lost_total").increment(1);
    }

    /// Get posted count
    pub fn posted(&self) -> u64 {
        self.posted.load(Ordering::Relaxed)
    }

    /// Get delivered count
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Get cached count
    pub fn cached(&self) -> u64 {
        self.cached.load(Ordering::Relaxed)
    }

    /// Get retried count
    pub fn retried(&self) -> u64 {
        self.retried.load(Ordering::Relaxed)
    }

    /// Get lost count
    pub fn lost(&self) -> u64 {
        self.lost.load(Ordering::Relaxed)
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            posted: self.posted(),
            delivered: self.delivered(),
            cached: self.cached(),
            retried: self.retried(),
            lost: self.lost(),
        }
    }
}

/// Snapshot of dispatch counters (for reporting)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsSnapshot {
    pub posted: u64,
    pub delivered: u64,
    pub cached: u64,
    pub retried: u64,
    pub lost: u64,
}
