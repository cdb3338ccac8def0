//! Request/response channel seam and the handler capabilities the engine
//! exposes to its collaborators.
//!
//! The channel owns request framing and bus I/O; the engine only ever hands
//! it a finished allocation result to broadcast.

use crate::engine::AllocationError;
use crate::types::{AllocationEntry, NodeId, UniqueId};

/// Outbound side of the allocation exchange.
pub trait AllocationChannel {
    /// One-shot initialization, performed after the replicated log is up.
    fn init(&mut self) -> Result<(), AllocationError>;

    /// Broadcasts a finished allocation result to the bus. A failure here is
    /// non-fatal; the requesting client retries on its own schedule.
    fn broadcast_result(
        &mut self,
        unique_id: UniqueId,
        node_id: NodeId,
    ) -> Result<(), AllocationError>;
}

/// Capability the channel holds into the engine: inbound request delivery
/// and the multi-frame exchange guard.
pub trait AllocationRequestHandler {
    /// Invoked per inbound allocation request. `preferred_node_id` may be
    /// any non-unicast value to mean "no preference". No precondition on
    /// leadership; the engine decides what, if anything, to do.
    fn handle_allocation_request(&mut self, unique_id: UniqueId, preferred_node_id: NodeId);

    /// Polled by the channel before it commits to a multi-frame exchange,
    /// i.e. for transports where the unique ID does not fit in one frame.
    /// Transports that carry the full unique ID in a single frame must not
    /// consult this guard.
    fn can_publish_followup_response(&self) -> bool;
}

/// Capability the replicated log holds into the engine: commit announcements
/// while the local node is leading.
pub trait LeaderCommitMonitor {
    /// Invoked exactly once per log position, at the moment it becomes
    /// committed, only while the local node is leader.
    fn handle_log_commit_on_leader(&mut self, entry: AllocationEntry);
}
