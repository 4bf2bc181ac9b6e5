//! Replacement policies.
//!
//! A policy owns all per-page bookkeeping (arrival order, last-use indices,
//! access frequencies, look-ahead) and decides, on a fault with a full table,
//! which occupied slot to give up. The frame table itself stays
//! policy-agnostic.
//!
//! Tie-breaking rules are load-bearing: two correct policies that break ties
//! differently produce different traces. Every `select_victim` below scans
//! occupied slots in slot order so selection is deterministic.

mod fifo;
mod lfu;
mod lru;
mod mru;
mod optimal;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimResult};
use crate::frames::FrameTable;
use crate::page::PageId;
use crate::reference::ReferenceString;

pub use fifo::FifoPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use optimal::OptimalPolicy;

/// A page-replacement strategy.
///
/// The runner drives each processed reference `p` at position `i` through a
/// fixed protocol:
///
/// 1. On a hit, `record_access(p, i)`.
/// 2. On a fault with a free slot, place `p` there, then `record_access(p, i)`.
/// 3. On a fault with a full table, `select_victim` names the slot to evict;
///    the victim's bookkeeping is dropped with `forget`, the slot is
///    overwritten, then `record_access(p, i)`.
pub trait ReplacementPolicy: Send {
    /// Which variant this policy implements.
    fn kind(&self) -> PolicyKind;

    /// Updates bookkeeping for a reference to `page` at position `index`.
    ///
    /// Called on every hit and after every placement. Implementations decide
    /// what (if anything) to track; FIFO ignores hits entirely.
    fn record_access(&mut self, page: PageId, index: usize);

    /// Chooses the occupied slot to evict.
    ///
    /// Only called when `frames.is_full()`. `index` is the position of the
    /// reference that faulted; only the Optimal policy looks at it.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the policy's bookkeeping and the table
    /// disagree (a bug, not a user-facing condition).
    fn select_victim(&self, frames: &FrameTable, index: usize) -> SimResult<usize>;

    /// Drops all bookkeeping for an evicted page.
    fn forget(&mut self, page: PageId);
}

/// The closed set of supported replacement algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyKind {
    /// First in, first out.
    Fifo,
    /// Least recently used.
    Lru,
    /// Most recently used.
    Mru,
    /// Least frequently used.
    Lfu,
    /// Optimal (farthest future use), requires full-sequence knowledge.
    Optimal,
}

impl PolicyKind {
    /// All variants, in presentation order.
    pub const ALL: [Self; 5] = [Self::Fifo, Self::Lru, Self::Mru, Self::Lfu, Self::Optimal];

    /// The short command name hosts use to select this algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lru => "LRU",
            Self::Mru => "MRU",
            Self::Lfu => "LFU",
            Self::Optimal => "OPR",
        }
    }

    /// The long display title hosts show for this algorithm.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Fifo => "First In, First Out",
            Self::Lru => "Least Recently Used",
            Self::Mru => "Most Recently Used",
            Self::Lfu => "Least Frequently Used",
            Self::Optimal => "Optimal Page Replacement",
        }
    }

    /// Builds a fresh policy instance for one run.
    ///
    /// Only the Optimal policy retains the reference string; every other
    /// variant works from causal history alone.
    #[must_use]
    pub fn build(self, reference: &ReferenceString) -> Box<dyn ReplacementPolicy> {
        match self {
            Self::Fifo => Box::new(FifoPolicy::new()),
            Self::Lru => Box::new(LruPolicy::new()),
            Self::Mru => Box::new(MruPolicy::new()),
            Self::Lfu => Box::new(LfuPolicy::new()),
            Self::Optimal => Box::new(OptimalPolicy::new(reference.clone())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    /// Accepts the host command names (`FIFO`, `LRU`, `MRU`, `LFU`, `OPR`,
    /// plus the `OPTIMAL` alias), case-insensitively.
    ///
    /// Unrecognized names fail loudly; a typo must not silently select a
    /// different algorithm.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIFO" => Ok(Self::Fifo),
            "LRU" => Ok(Self::Lru),
            "MRU" => Ok(Self::Mru),
            "LFU" => Ok(Self::Lfu),
            "OPR" | "OPTIMAL" => Ok(Self::Optimal),
            _ => Err(ConfigError::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}
