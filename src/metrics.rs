//! Allocation metrics.
//!
//! Lock-free counters shared behind an `Arc`; cheap to clone and safe to
//! read from outside the engine's thread of control.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters maintained by the allocation engine.
#[derive(Debug, Clone, Default)]
pub struct AllocationMetrics {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    requests_received: AtomicU64,
    responses_broadcast: AtomicU64,
    allocations_proposed: AtomicU64,
    exhaustion_drops: AtomicU64,
    append_failures: AtomicU64,
    broadcast_failures: AtomicU64,
}

impl AllocationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_request(&self) {
        self.inner.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_response(&self) {
        self.inner
            .responses_broadcast
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_proposal(&self) {
        self.inner
            .allocations_proposed
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_exhaustion_drop(&self) {
        self.inner.exhaustion_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_append_failure(&self) {
        self.inner.append_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_broadcast_failure(&self) {
        self.inner
            .broadcast_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_received: self.inner.requests_received.load(Ordering::Relaxed),
            responses_broadcast: self.inner.responses_broadcast.load(Ordering::Relaxed),
            allocations_proposed: self.inner.allocations_proposed.load(Ordering::Relaxed),
            exhaustion_drops: self.inner.exhaustion_drops.load(Ordering::Relaxed),
            append_failures: self.inner.append_failures.load(Ordering::Relaxed),
            broadcast_failures: self.inner.broadcast_failures.load(Ordering::Relaxed),
        }
    }
}

/// Plain-data view of [`AllocationMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub requests_received: u64,
    pub responses_broadcast: u64,
    pub allocations_proposed: u64,
    pub exhaustion_drops: u64,
    pub append_failures: u64,
    pub broadcast_failures: u64,
}
