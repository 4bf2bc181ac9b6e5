//! Least-frequently-used replacement.

use std::collections::HashMap;

use crate::error::{SimResult, SimulatorError};
use crate::frames::FrameTable;
use crate::page::PageId;

use super::{PolicyKind, ReplacementPolicy};

#[derive(Debug, Clone, Copy)]
struct Usage {
    frequency: usize,
    last_used: usize,
}

/// Evicts the resident page with the smallest access frequency.
///
/// Frequency ties are broken by the smallest last-referenced index, i.e. the
/// oldest among the equally infrequent pages. A page's frequency starts at 1
/// on placement, grows on every hit, and is discarded on eviction, so a page
/// that returns after eviction starts cold.
#[derive(Debug, Default)]
pub struct LfuPolicy {
    usage: HashMap<PageId, Usage>,
}

impl LfuPolicy {
    /// Creates an empty LFU policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplacementPolicy for LfuPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lfu
    }

    fn record_access(&mut self, page: PageId, index: usize) {
        self.usage
            .entry(page)
            .and_modify(|usage| {
                usage.frequency += 1;
                usage.last_used = index;
            })
            .or_insert(Usage {
                frequency: 1,
                last_used: index,
            });
    }

    fn select_victim(&self, frames: &FrameTable, _index: usize) -> SimResult<usize> {
        let mut victim: Option<(usize, Usage)> = None;

        for slot in 0..frames.frame_count() {
            let Some(page) = frames.page_at(slot) else {
                continue;
            };
            let usage = *self.usage.get(&page).ok_or_else(|| {
                SimulatorError::internal(format!("LFU has no usage record for resident page {page}"))
            })?;

            let replace = match victim {
                None => true,
                Some((_, best)) => {
                    usage.frequency < best.frequency
                        || (usage.frequency == best.frequency && usage.last_used < best.last_used)
                }
            };
            if replace {
                victim = Some((slot, usage));
            }
        }

        victim
            .map(|(slot, _)| slot)
            .ok_or_else(|| SimulatorError::internal("LFU victim selection on an empty table"))
    }

    fn forget(&mut self, page: PageId) {
        self.usage.remove(&page);
    }
}
