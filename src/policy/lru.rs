//! Least-recently-used replacement.

use std::collections::HashMap;

use crate::error::{SimResult, SimulatorError};
use crate::frames::FrameTable;
use crate::page::PageId;

use super::{PolicyKind, ReplacementPolicy};

/// Evicts the resident page with the smallest last-referenced index.
///
/// Exact ties cannot occur (each reference position is unique per page); the
/// slot-order scan makes the first-found rule explicit anyway.
#[derive(Debug, Default)]
pub struct LruPolicy {
    last_used: HashMap<PageId, usize>,
}

impl LruPolicy {
    /// Creates an empty LRU policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplacementPolicy for LruPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lru
    }

    fn record_access(&mut self, page: PageId, index: usize) {
        self.last_used.insert(page, index);
    }

    fn select_victim(&self, frames: &FrameTable, _index: usize) -> SimResult<usize> {
        let mut victim: Option<(usize, usize)> = None;

        for slot in 0..frames.frame_count() {
            let Some(page) = frames.page_at(slot) else {
                continue;
            };
            let last = *self.last_used.get(&page).ok_or_else(|| {
                SimulatorError::internal(format!("LRU has no last-use record for resident page {page}"))
            })?;

            match victim {
                Some((_, best)) if last >= best => {}
                _ => victim = Some((slot, last)),
            }
        }

        victim
            .map(|(slot, _)| slot)
            .ok_or_else(|| SimulatorError::internal("LRU victim selection on an empty table"))
    }

    fn forget(&mut self, page: PageId) {
        self.last_used.remove(&page);
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
    fn evicts_the_least_recently_used_page() {
        let mut policy = LruPolicy::new();
        let table = full_table(&[1, 2, 3]);
        policy.record_access(PageId::new(1), 0);
        policy.record_access(PageId::new(2), 1);
        policy.record_access(PageId::new(3), 2);

        // 1 is touched again, so 2 becomes the oldest use.
        policy.record_access(PageId::new(1), 3);
        assert_eq!(policy.select_victim(&table, 4).unwrap(), 1);
    }

    #[test]
    fn forget_removes_bookkeeping() {
        let mut policy = LruPolicy::new();
        let table = full_table(&[1, 2]);
        policy.record_access(PageId::new(1), 0);
        policy.record_access(PageId::new(2), 1);

        policy.forget(PageId::new(1));
        policy.record_access(PageId::new(1), 5);
        assert_eq!(policy.select_victim(&table, 6).unwrap(), 1);
    }

    #[test]
    fn missing_bookkeeping_is_an_internal_error() {
        let policy = LruPolicy::new();
        let table = full_table(&[1]);
        assert!(policy.select_victim(&table, 0).unwrap_err().is_internal());
    }
}
