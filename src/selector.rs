//! Free node-ID search.
//!
//! Owns the selection policy: the preferred ID wins if free, otherwise the
//! nearest free ID found by scanning upward from the preferred value and
//! then downward. The caller supplies the taken-predicate; this module never
//! inspects the log itself.

use crate::types::NodeId;

/// Returns an unused unicast node ID, or [`NodeId::NONE`] when the address
/// space is exhausted.
///
/// A non-unicast `preferred` (or one above [`NodeId::MAX_REGULAR`]) means
/// "no preference" and starts the scan at `MAX_REGULAR`. IDs above
/// `MAX_REGULAR` are reserved and never returned.
pub fn find_free_node_id<F>(preferred: NodeId, is_taken: F) -> NodeId
where
    F: Fn(NodeId) -> bool,
{
    let start = if preferred.is_unicast() && preferred <= NodeId::MAX_REGULAR {
        preferred.get()
    } else {
        NodeId::MAX_REGULAR.get()
    };

    let mut candidate = start;
    while candidate <= NodeId::MAX_REGULAR.get() {
        let node_id = NodeId::new(candidate);
        if !is_taken(node_id) {
            return node_id;
        }
        candidate += 1;
    }

    let mut candidate = start;
    while candidate >= 1 {
        let node_id = NodeId::new(candidate);
        if !is_taken(node_id) {
            return node_id;
        }
        candidate -= 1;
    }

    NodeId::NONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_wins_when_free() {
        let found = find_free_node_id(NodeId::new(5), |_| false);
        assert_eq!(found, NodeId::new(5));
    }

    #[test]
    fn test_scans_upward_past_taken_preferred() {
        let found = find_free_node_id(NodeId::new(5), |id| id.get() <= 7);
        assert_eq!(found, NodeId::new(8));
    }

    #[test]
    fn test_falls_back_downward_at_upper_end() {
        // Everything from the preferred value upward is taken.
        let found = find_free_node_id(NodeId::new(124), |id| id.get() >= 124);
        assert_eq!(found, NodeId::new(123));
    }

    #[test]
    fn test_no_preference_starts_at_max_regular() {
        let found = find_free_node_id(NodeId::BROADCAST, |_| false);
        assert_eq!(found, NodeId::MAX_REGULAR);
    }

    #[test]
    fn test_reserved_top_ids_never_returned() {
        // 126 and 127 are unicast but reserved; a preference for them is
        // treated as no preference.
        let found = find_free_node_id(NodeId::new(127), |_| false);
        assert_eq!(found, NodeId::MAX_REGULAR);
    }

    #[test]
    fn test_exhaustion_yields_none_sentinel() {
        let found = find_free_node_id(NodeId::new(5), |_| true);
        assert_eq!(found, NodeId::NONE);
        assert!(!found.is_unicast());
    }
}
