//! Core data types of the allocation protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware-assigned unique identifier of a device seeking a network address.
///
/// Issued once by hardware and immutable for the lifetime of the device. The
/// allocator only ever uses it as a lookup key; it is never generated or
/// modified here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniqueId([u8; 16]);

impl UniqueId {
    /// Length of a unique ID in bytes.
    pub const LEN: usize = 16;

    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl From<[u8; UniqueId::LEN]> for UniqueId {
    fn from(bytes: [u8; UniqueId::LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Bus network address of a node.
///
/// Only values in `1..=MAX` are valid unicast addresses; `BROADCAST` and
/// `NONE` are reserved and must never be allocated to a device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(u8);

impl NodeId {
    /// Broadcast address; doubles as the "no preference" sentinel in
    /// allocation requests.
    pub const BROADCAST: NodeId = NodeId(0);

    /// Highest valid unicast address.
    pub const MAX: NodeId = NodeId(127);

    /// Highest address handed out to regular nodes. The IDs above it are
    /// reserved for infrastructure and are never produced by the free-ID
    /// search.
    pub const MAX_REGULAR: NodeId = NodeId(125);

    /// Invalid sentinel, e.g. "no free node ID left".
    pub const NONE: NodeId = NodeId(255);

    pub const fn new(value: u8) -> Self {
        NodeId(value)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// True iff this ID may be assigned to a device.
    pub const fn is_unicast(self) -> bool {
        self.0 >= 1 && self.0 <= Self::MAX.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One allocation decision: a unique ID bound to a node ID.
///
/// Created only by the engine appending to the replicated log while leader;
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub unique_id: UniqueId,
    pub node_id: NodeId,
}

/// A view onto one log position at query time: the entry plus whether it was
/// committed when the log was searched.
///
/// Transient; the committed flag is only meaningful for the call that
/// produced it (it is monotonic per position, but a snapshot may be stale).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntryInfo {
    pub entry: AllocationEntry,
    pub committed: bool,
}

/// Expected number of cooperating allocators in the cluster.
///
/// Consumed once at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClusterSize {
    /// Determine the cluster size dynamically via discovery.
    #[default]
    Unknown,
    /// The cluster size is known statically.
    Fixed(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id_display_is_hex() {
        let id = UniqueId::new([0xde, 0xad, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff]);
        assert_eq!(id.to_string(), "dead00000000000000000000000000ff");
    }

    #[test]
    fn test_node_id_unicast_range() {
        assert!(!NodeId::BROADCAST.is_unicast());
        assert!(NodeId::new(1).is_unicast());
        assert!(NodeId::MAX_REGULAR.is_unicast());
        assert!(NodeId::MAX.is_unicast());
        assert!(!NodeId::new(128).is_unicast());
        assert!(!NodeId::NONE.is_unicast());
    }

    #[test]
    fn test_entry_serialization_roundtrip() {
        let entry = AllocationEntry {
            unique_id: UniqueId::new([7; 16]),
            node_id: NodeId::new(42),
        };

        let serialized = serde_json::to_vec(&entry).unwrap();
        let deserialized: AllocationEntry = serde_json::from_slice(&serialized).unwrap();
        assert_eq!(deserialized, entry);
    }

    #[test]
    fn test_cluster_size_default_is_unknown() {
        assert_eq!(ClusterSize::default(), ClusterSize::Unknown);
    }
}
