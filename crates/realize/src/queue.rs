use std::collections::VecDeque;

use sightline_common::{Domain, ObjectHandle};

/// One queue entry: a handle awaiting realization, stamped with the world
/// generation it was enqueued under. The drain verifies the stamp against
/// the current generation before acting, so a world switch invalidates
/// stale work without dereferencing destroyed objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRealize {
    pub handle: ObjectHandle,
    pub generation: u64,
}

/// FIFO of handles awaiting one-time realization for a single domain.
///
/// Insertion order is preserved: realization follows visibility-change
/// order within the domain. No ordering guarantee exists across domains.
#[derive(Debug)]
pub struct RealizeQueue {
    domain: Domain,
    entries: VecDeque<PendingRealize>,
}

impl RealizeQueue {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            entries: VecDeque::new(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Enqueue a handle. The caller is responsible for the at-most-once
    /// guard (the tracked object's `requested` flag).
    pub fn push(&mut self, handle: ObjectHandle, generation: u64) {
        tracing::trace!(domain = %self.domain, ?handle, generation, "enqueue realize");
        self.entries.push_back(PendingRealize { handle, generation });
    }

    /// Dequeue the oldest entry. Dequeue is terminal: the entry is never
    /// reinserted.
    pub fn pop(&mut self) -> Option<PendingRealize> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cancel every pending entry, used on domain reset and world unload.
    /// Returns the number of entries dropped.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.entries.len();
        if cancelled > 0 {
            tracing::debug!(domain = %self.domain, cancelled, "cancelled pending realizations");
        }
        self.entries.clear();
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let mut queue = RealizeQueue::new(Domain::SmallMesh);
        let a = ObjectHandle::new();
        let b = ObjectHandle::new();
        queue.push(a, 1);
        queue.push(b, 1);

        assert_eq!(queue.pop().map(|e| e.handle), Some(a));
        assert_eq!(queue.pop().map(|e| e.handle), Some(b));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn entries_carry_generation() {
        let mut queue = RealizeQueue::new(Domain::Npc);
        queue.push(ObjectHandle::new(), 7);
        assert_eq!(queue.pop().unwrap().generation, 7);
    }

    #[test]
    fn cancel_all_reports_count() {
        let mut queue = RealizeQueue::new(Domain::Sound);
        queue.push(ObjectHandle::new(), 1);
        queue.push(ObjectHandle::new(), 1);
        assert_eq!(queue.cancel_all(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.cancel_all(), 0);
    }
}
