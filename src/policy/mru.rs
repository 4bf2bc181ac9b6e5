//! Most-recently-used replacement.

use std::collections::HashMap;

use crate::error::{SimResult, SimulatorError};
use crate::frames::FrameTable;
use crate::page::PageId;

use super::{PolicyKind, ReplacementPolicy};

/// Evicts the resident page with the *largest* last-referenced index.
///
/// Deliberately the inverse of LRU; it loses badly on most workloads and is
/// kept for pedagogical contrast.
#[derive(Debug, Default)]
pub struct MruPolicy {
    last_used: HashMap<PageId, usize>,
}

impl MruPolicy {
    /// Creates an empty MRU policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplacementPolicy for MruPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Mru
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
                SimulatorError::internal(format!("MRU has no last-use record for resident page {page}"))
            })?;

            match victim {
                Some((_, best)) if last <= best => {}
                _ => victim = Some((slot, last)),
            }
        }

        victim
            .map(|(slot, _)| slot)
            .ok_or_else(|| SimulatorError::internal("MRU victim selection on an empty table"))
    }

    fn forget(&mut self, page: PageId) {
        self.last_used.remove(&page);
    }
}
