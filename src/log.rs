//! Replicated allocation log seam.
//!
//! The engine treats the log as the single source of truth and queries it
//! freshly on every decision; it never caches entries or commit flags across
//! handler invocations. Leader election, replication and commit detection
//! live behind this trait.

use crate::engine::AllocationError;
use crate::types::{AllocationEntry, ClusterSize, LogEntryInfo, NodeId, UniqueId};

/// Append-only, leader-coordinated sequence of allocation entries.
///
/// Implementations own all shared state and serialize access to it; the
/// engine calls in from a single logical thread only.
pub trait ReplicatedLog {
    /// One-shot initialization with the expected cluster size. Not retried
    /// by the engine; a failure aborts the whole init sequence.
    fn init(&mut self, cluster_size: ClusterSize) -> Result<(), AllocationError>;

    /// True while the local node currently believes itself leader.
    fn is_leader(&self) -> bool;

    /// True when no entry in the log is still awaiting commitment.
    fn all_entries_committed(&self) -> bool;

    /// Scans the log from the newest entry backward and returns the first
    /// entry matching the predicate, together with its commit state at query
    /// time. Returns `None` when nothing matches; a default entry is never
    /// used to signal absence.
    fn find_entry_from_end(
        &self,
        predicate: &dyn Fn(&AllocationEntry) -> bool,
    ) -> Option<LogEntryInfo>;

    /// Proposes a new allocation entry. Only called while leader; whether
    /// the entry becomes durable is decided entirely by the replication
    /// machinery. A failure here is non-fatal to the process.
    fn append(&mut self, unique_id: UniqueId, node_id: NodeId) -> Result<(), AllocationError>;
}

/// In-memory replicated log for tests and single-process harnesses.
///
/// The committed region is always a prefix of the log, which matches the
/// real replication machinery: entries commit strictly in append order.
#[derive(Debug, Default)]
pub struct InMemoryLog {
    entries: Vec<AllocationEntry>,
    committed: usize,
    leader: bool,
    cluster_size: Option<ClusterSize>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the local leadership belief.
    pub fn set_leader(&mut self, leader: bool) {
        self.leader = leader;
    }

    /// Marks every entry currently in the log as committed.
    pub fn commit_all(&mut self) {
        self.committed = self.entries.len();
    }

    /// Appends an already-committed entry, e.g. one inherited from a
    /// previous leader.
    ///
    /// # Panics
    ///
    /// Panics if uncommitted entries precede it; commitment is a prefix.
    pub fn push_committed(&mut self, entry: AllocationEntry) {
        assert_eq!(
            self.committed,
            self.entries.len(),
            "cannot commit past pending entries"
        );
        self.entries.push(entry);
        self.committed = self.entries.len();
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    /// Cluster size the log was initialized with, if `init` has run.
    pub fn cluster_size(&self) -> Option<ClusterSize> {
        self.cluster_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReplicatedLog for InMemoryLog {
    fn init(&mut self, cluster_size: ClusterSize) -> Result<(), AllocationError> {
        self.cluster_size = Some(cluster_size);

        tracing::debug!(cluster_size = ?cluster_size, "In-memory log initialized");
        Ok(())
    }

    fn is_leader(&self) -> bool {
        self.leader
    }

    fn all_entries_committed(&self) -> bool {
        self.committed == self.entries.len()
    }

    fn find_entry_from_end(
        &self,
        predicate: &dyn Fn(&AllocationEntry) -> bool,
    ) -> Option<LogEntryInfo> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .find(|(_, entry)| predicate(entry))
            .map(|(index, entry)| LogEntryInfo {
                entry: *entry,
                committed: index < self.committed,
            })
    }

    fn append(&mut self, unique_id: UniqueId, node_id: NodeId) -> Result<(), AllocationError> {
        self.entries.push(AllocationEntry { unique_id, node_id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(tag: u8) -> UniqueId {
        UniqueId::new([tag; 16])
    }

    fn entry(tag: u8, node_id: u8) -> AllocationEntry {
        AllocationEntry {
            unique_id: uid(tag),
            node_id: NodeId::new(node_id),
        }
    }

    #[test]
    fn test_search_returns_newest_match_first() {
        let mut log = InMemoryLog::new();
        log.push_committed(entry(1, 10));
        log.push_committed(entry(2, 11));
        log.append(uid(3), NodeId::new(12)).unwrap();

        // Same node ID appears twice; the newest (uncommitted) wins.
        log.append(uid(4), NodeId::new(10)).unwrap();

        let found = log
            .find_entry_from_end(&|e: &AllocationEntry| e.node_id == NodeId::new(10))
            .unwrap();
        assert_eq!(found.entry.unique_id, uid(4));
        assert!(!found.committed);
    }

    #[test]
    fn test_search_reports_commit_state() {
        let mut log = InMemoryLog::new();
        log.push_committed(entry(1, 10));
        log.append(uid(2), NodeId::new(11)).unwrap();

        let committed = log
            .find_entry_from_end(&|e: &AllocationEntry| e.unique_id == uid(1))
            .unwrap();
        assert!(committed.committed);

        let pending = log
            .find_entry_from_end(&|e: &AllocationEntry| e.unique_id == uid(2))
            .unwrap();
        assert!(!pending.committed);
    }

    #[test]
    fn test_search_miss_is_none() {
        let mut log = InMemoryLog::new();
        log.push_committed(entry(1, 10));

        let found = log.find_entry_from_end(&|e: &AllocationEntry| e.unique_id == uid(9));
        assert!(found.is_none());
    }

    #[test]
    fn test_all_entries_committed() {
        let mut log = InMemoryLog::new();
        assert!(log.all_entries_committed());

        log.append(uid(1), NodeId::new(10)).unwrap();
        assert!(!log.all_entries_committed());

        log.commit_all();
        assert!(log.all_entries_committed());
    }
}
