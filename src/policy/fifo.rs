//! First-in, first-out replacement.

use std::collections::VecDeque;

use crate::error::{SimResult, SimulatorError};
use crate::frames::FrameTable;
use crate::page::PageId;

use super::{PolicyKind, ReplacementPolicy};

/// Evicts the page that has been resident longest.
///
/// Residency is a strict insertion-order queue: a page enters the queue when
/// it is placed in a frame and leaves only when evicted. A hit does not
/// requeue the page.
#[derive(Debug, Default)]
pub struct FifoPolicy {
    queue: VecDeque<PageId>,
}

impl FifoPolicy {
    /// Creates an empty FIFO policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fifo
    }

    fn record_access(&mut self, page: PageId, _index: usize) {
        // A page absent from the queue was just placed; a present page is a
        // hit and keeps its original position.
        if !self.queue.contains(&page) {
            self.queue.push_back(page);
        }
    }

    fn select_victim(&self, frames: &FrameTable, _index: usize) -> SimResult<usize> {
        let oldest = self
            .queue
            .front()
            .copied()
            .ok_or_else(|| SimulatorError::internal("FIFO victim selection on an empty queue"))?;

        frames.slot_of(oldest).ok_or_else(|| {
            SimulatorError::internal(format!("FIFO queue head {oldest} is not resident"))
        })
    }

    fn forget(&mut self, page: PageId) {
        self.queue.retain(|queued| *queued != page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_table(pages: &[i64]) -> FrameTable {
        let mut table = FrameTable::new(pages.len()).unwrap();
        for (slot, &page) in pages.iter().enumerate() {
            table.occupy(slot, PageId::new(page));
        }
        table
    }

    #[test]
    fn evicts_in_insertion_order() {
        let mut policy = FifoPolicy::new();
        let table = full_table(&[1, 2, 3]);
        policy.record_access(PageId::new(1), 0);
        policy.record_access(PageId::new(2), 1);
        policy.record_access(PageId::new(3), 2);

        assert_eq!(policy.select_victim(&table, 3).unwrap(), 0);

        policy.forget(PageId::new(1));
        assert_eq!(policy.select_victim(&table, 4).unwrap(), 1);
    }

    #[test]
    fn hits_do_not_requeue() {
        let mut policy = FifoPolicy::new();
        let table = full_table(&[1, 2, 3]);
        policy.record_access(PageId::new(1), 0);
        policy.record_access(PageId::new(2), 1);
        policy.record_access(PageId::new(3), 2);

        // Hit on the oldest page; it must remain the eviction candidate.
        policy.record_access(PageId::new(1), 3);
        assert_eq!(policy.select_victim(&table, 4).unwrap(), 0);
    }

    #[test]
    fn empty_queue_is_an_internal_error() {
        let policy = FifoPolicy::new();
        let table = full_table(&[1]);
        let err = policy.select_victim(&table, 0).unwrap_err();
        assert!(err.is_internal());
    }
}
