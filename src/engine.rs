//! Allocation decision engine.
//!
//! Decides, per inbound allocation request and per commit notification, what
//! response (if any) to produce and whether a new allocation may be proposed.
//! All decisions are computed against the replicated log within a single
//! synchronous handler invocation; nothing is cached across requests.

use crate::channel::{AllocationChannel, AllocationRequestHandler, LeaderCommitMonitor};
use crate::log::ReplicatedLog;
use crate::metrics::AllocationMetrics;
use crate::selector;
use crate::types::{AllocationEntry, ClusterSize, NodeId, UniqueId};

// ============================================================================
// ERRORS
// ============================================================================

/// Error type for collaborator operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Replicated log error: {0}")]
    Log(String),
    #[error("Channel error: {0}")]
    Channel(String),
}

// ============================================================================
// FAILURE REPORTING
// ============================================================================

/// Process-wide diagnostic sink for non-fatal collaborator failures.
///
/// Fire-and-forget: implementations must never block and never fail.
pub trait FailureReporter: Send {
    fn report_internal_failure(&self, reason: &str);
}

/// Default reporter that forwards failures to the tracing subscriber.
#[derive(Debug, Default, Clone)]
pub struct TracingFailureReporter;

impl FailureReporter for TracingFailureReporter {
    fn report_internal_failure(&self, reason: &str) {
        tracing::error!(reason = reason, "Internal failure");
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// The allocation decision engine.
///
/// Composes the replicated log, the request/response channel and the free-ID
/// search into the allocation protocol. Handler invocations run to
/// completion before returning control; a multi-threaded host must serialize
/// calls into the engine.
pub struct AllocationEngine<L, C> {
    log: L,
    channel: C,
    reporter: Box<dyn FailureReporter>,
    metrics: AllocationMetrics,
}

impl<L, C> AllocationEngine<L, C>
where
    L: ReplicatedLog,
    C: AllocationChannel,
{
    /// Creates an engine reporting failures via [`TracingFailureReporter`].
    pub fn new(log: L, channel: C) -> Self {
        Self::with_reporter(log, channel, Box::new(TracingFailureReporter))
    }

    /// Creates an engine with an injected failure sink.
    pub fn with_reporter(log: L, channel: C, reporter: Box<dyn FailureReporter>) -> Self {
        Self {
            log,
            channel,
            reporter,
            metrics: AllocationMetrics::new(),
        }
    }

    /// Initializes the collaborators in order: replicated log first, then
    /// the channel. A log failure aborts before the channel is touched.
    /// One-shot and non-retrying; the caller owns retrying the sequence.
    pub fn init(&mut self, cluster_size: ClusterSize) -> Result<(), AllocationError> {
        self.log.init(cluster_size)?;
        self.channel.init()?;

        tracing::info!(cluster_size = ?cluster_size, "Allocation engine initialized");
        Ok(())
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Handle to the engine's metrics; cheap to clone.
    pub fn metrics(&self) -> AllocationMetrics {
        self.metrics.clone()
    }

    /// Proposes an allocation for a unique ID the log has never seen.
    /// Only reachable while leader.
    fn allocate_new_node(&mut self, unique_id: UniqueId, preferred_node_id: NodeId) {
        // Both committed and pending entries block re-use; proposing a
        // collision that would only surface at commit time must be
        // impossible.
        let log = &self.log;
        let allocated = selector::find_free_node_id(preferred_node_id, |candidate| {
            log.find_entry_from_end(&|entry: &AllocationEntry| entry.node_id == candidate)
                .is_some()
        });

        if !allocated.is_unicast() {
            self.metrics.record_exhaustion_drop();
            tracing::warn!(
                unique_id = %unique_id,
                "Allocation request dropped; no free node ID left"
            );
            return;
        }

        tracing::info!(
            unique_id = %unique_id,
            node_id = %allocated,
            "Proposing new node ID allocation"
        );

        self.metrics.record_proposal();
        if let Err(e) = self.log.append(unique_id, allocated) {
            // The entry simply does not exist; the client retries and the
            // whole decision is recomputed from scratch.
            self.metrics.record_append_failure();
            self.reporter
                .report_internal_failure(&format!("log append of new allocation: {e}"));
        }
    }

    fn try_publish_result(&mut self, entry: AllocationEntry) {
        match self
            .channel
            .broadcast_result(entry.unique_id, entry.node_id)
        {
            Ok(()) => self.metrics.record_response(),
            Err(e) => {
                self.metrics.record_broadcast_failure();
                self.reporter
                    .report_internal_failure(&format!("allocation result broadcast: {e}"));
            }
        }
    }
}

impl<L, C> AllocationRequestHandler for AllocationEngine<L, C>
where
    L: ReplicatedLog,
    C: AllocationChannel,
{
    fn handle_allocation_request(&mut self, unique_id: UniqueId, preferred_node_id: NodeId) {
        self.metrics.record_request();

        // The local node may well not be leader. The log search still runs:
        // a committed entry for this unique ID can be answered by anyone.
        let found = self
            .log
            .find_entry_from_end(&|entry: &AllocationEntry| entry.unique_id == unique_id);

        match found {
            Some(info) if info.committed => {
                tracing::debug!(
                    unique_id = %unique_id,
                    node_id = %info.entry.node_id,
                    "Allocation request served from existing committed entry"
                );
                self.try_publish_result(info.entry);
            }
            Some(info) => {
                // The commit notification path answers this one, if at all.
                tracing::debug!(
                    unique_id = %unique_id,
                    node_id = %info.entry.node_id,
                    "Allocation request ignored; entry exists but is not committed yet"
                );
            }
            None => {
                if self.log.is_leader() {
                    self.allocate_new_node(unique_id, preferred_node_id);
                }
            }
        }
    }

    fn can_publish_followup_response(&self) -> bool {
        // Split-brain containment: a minority-partition leader mid-exchange
        // could assemble unique-ID fragments from two different clients.
        // A fully committed log approximates "no contention window is open"
        // without explicit mutual exclusion across the exchange.
        self.log.is_leader() && self.log.all_entries_committed()
    }
}

impl<L, C> LeaderCommitMonitor for AllocationEngine<L, C>
where
    L: ReplicatedLog,
    C: AllocationChannel,
{
    fn handle_log_commit_on_leader(&mut self, entry: AllocationEntry) {
        // This node may never have seen the request; the entry is durably
        // agreed, which always warrants notifying the bus.
        tracing::debug!(
            unique_id = %entry.unique_id,
            node_id = %entry.node_id,
            "Broadcasting committed allocation"
        );
        self.try_publish_result(entry);
    }
}

// ============================================================================
// TESTS
// ============================================================================
