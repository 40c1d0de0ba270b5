//! Append-only set of processed exit ids

use std::collections::HashSet;

use alloy_primitives::B256;

#[derive(Debug, Clone, Default)]
pub struct ExitTracker {
    processed: HashSet<B256>,
}

impl ExitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processed(&self, exit_id: &B256) -> bool {
        self.processed.contains(exit_id)
    }

    /// Record `exit_id`, returning false if it was already recorded.
    ///
    /// Check and insert are a single operation, and `&mut self` serializes
    /// callers.
    pub fn mark_if_unseen(&mut self, exit_id: B256) -> bool {
        self.processed.insert(exit_id)
    }

    /// Undo a mark made earlier in the same exit call when a later step of
    /// that call fails.
    pub(crate) fn revert(&mut self, exit_id: &B256) {
        self.processed.remove(exit_id);
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_once() {
        let mut tracker = ExitTracker::new();
        let id = B256::repeat_byte(7);
        assert!(!tracker.is_processed(&id));
        assert!(tracker.mark_if_unseen(id));
        assert!(!tracker.mark_if_unseen(id));
        assert!(tracker.is_processed(&id));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_revert_unmarks() {
        let mut tracker = ExitTracker::new();
        let id = B256::repeat_byte(7);
        tracker.mark_if_unseen(id);
        tracker.revert(&id);
        assert!(tracker.is_empty());
        assert!(tracker.mark_if_unseen(id));
    }
}
