//! Physical frame storage.
//!
//! `FrameTable` is a pure storage abstraction: a fixed array of slots, each
//! either empty or holding one page. No eviction logic lives here; replacement
//! policies decide which slot to overwrite and are responsible for keeping a
//! page in at most one slot.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::page::PageId;

/// Smallest allowed number of physical frames.
pub const MIN_FRAME_COUNT: usize = 1;

/// Largest allowed number of physical frames.
pub const MAX_FRAME_COUNT: usize = 7;

/// A fixed-capacity table of physical memory frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTable {
    slots: Vec<Option<PageId>>,
}

impl FrameTable {
    /// Creates a table with `frame_count` empty slots.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FrameCountOutOfRange`] unless
    /// `MIN_FRAME_COUNT <= frame_count <= MAX_FRAME_COUNT`. A zero-frame
    /// table would make every reference an unconditional fault with no
    /// possible eviction, so it is rejected up front.
    pub fn new(frame_count: usize) -> Result<Self, ConfigError> {
        if !(MIN_FRAME_COUNT..=MAX_FRAME_COUNT).contains(&frame_count) {
            return Err(ConfigError::FrameCountOutOfRange { value: frame_count });
        }
        Ok(Self {
            slots: vec![None; frame_count],
        })
    }

    /// Number of slots in the table.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.slots.len()
    }

    /// True when `page` is resident in some slot.
    #[must_use]
    pub fn contains(&self, page: PageId) -> bool {
        self.slots.contains(&Some(page))
    }

    /// The slot currently holding `page`, if resident.
    #[must_use]
    pub fn slot_of(&self, page: PageId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(page))
    }

    /// The lowest-indexed empty slot, or `None` when the table is full.
    #[must_use]
    pub fn first_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// The page occupying `slot`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of bounds; slot indices come from this table.
    #[must_use]
    pub fn page_at(&self, slot: usize) -> Option<PageId> {
        self.slots[slot]
    }

    /// Overwrites `slot` with `page`.
    ///
    /// The caller (the active policy) is responsible for first evicting a
    /// page that would otherwise become resident in two slots.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of bounds; slot indices come from this table.
    pub fn occupy(&mut self, slot: usize, page: PageId) {
        self.slots[slot] = Some(page);
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn occupancy_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when every slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// An ordered copy of the current slot contents.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Option<PageId>> {
        self.slots.clone()
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_frame_counts() {
        assert_eq!(
            FrameTable::new(0).unwrap_err(),
            ConfigError::FrameCountOutOfRange { value: 0 }
        );
        assert_eq!(
            FrameTable::new(8).unwrap_err(),
            ConfigError::FrameCountOutOfRange { value: 8 }
        );
        assert!(FrameTable::new(1).is_ok());
        assert!(FrameTable::new(7).is_ok());
    }

    #[test]
    fn fills_lowest_empty_slot_first() {
        let mut table = FrameTable::new(3).unwrap();
        assert_eq!(table.first_empty_slot(), Some(0));

        table.occupy(0, PageId::new(1));
        assert_eq!(table.first_empty_slot(), Some(1));

        table.occupy(1, PageId::new(2));
        table.occupy(2, PageId::new(3));
        assert_eq!(table.first_empty_slot(), None);
        assert!(table.is_full());
    }

    #[test]
    fn tracks_residency_and_occupancy() {
        let mut table = FrameTable::new(3).unwrap();
        assert_eq!(table.occupancy_count(), 0);
        assert!(!table.contains(PageId::new(5)));

        table.occupy(1, PageId::new(5));
        assert!(table.contains(PageId::new(5)));
        assert_eq!(table.slot_of(PageId::new(5)), Some(1));
        assert_eq!(table.occupancy_count(), 1);
        assert_eq!(table.page_at(0), None);
        assert_eq!(table.page_at(1), Some(PageId::new(5)));
    }

    #[test]
    fn occupy_overwrites_in_place() {
        let mut table = FrameTable::new(2).unwrap();
        table.occupy(0, PageId::new(1));
        table.occupy(0, PageId::new(9));
        assert_eq!(table.page_at(0), Some(PageId::new(9)));
        assert!(!table.contains(PageId::new(1)));
        assert_eq!(table.occupancy_count(), 1);
    }

    #[test]
    fn snapshot_is_ordered_and_detached() {
        let mut table = FrameTable::new(3).unwrap();
        table.occupy(0, PageId::new(1));
        table.occupy(2, PageId::new(3));

        let snap = table.snapshot();
        assert_eq!(snap, vec![Some(PageId::new(1)), None, Some(PageId::new(3))]);

        table.occupy(1, PageId::new(2));
        assert_eq!(snap[1], None);
    }

    #[test]
    fn clear_empties_every_slot() {
        let mut table = FrameTable::new(2).unwrap();
        table.occupy(0, PageId::new(1));
        table.occupy(1, PageId::new(2));
        table.clear();
        assert_eq!(table.occupancy_count(), 0);
        assert_eq!(table.first_empty_slot(), Some(0));
    }
}
