//! The simulation state machine.
//!
//! `SimulationRunner` replays a reference string one reference per tick
//! against a frame table and a replacement policy, classifying each reference
//! as a hit or a fault and publishing every step through a [`StepReporter`].
//! It is deliberately synchronous and scheduler-free: the host decides
//! whether ticks are driven by a timer, a frame callback, or a plain loop.
//! [`crate::driver::SimulationDriver`] provides the timed, pausable host.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulatorError, StateError};
use crate::frames::FrameTable;
use crate::page::PageId;
use crate::policy::{PolicyKind, ReplacementPolicy};
use crate::reference::ReferenceString;
use crate::reporter::StepReporter;
use crate::step::{Access, SimulationStatistics, StepResult};

/// Lifecycle state of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No run has been configured.
    Idle,
    /// A run is in flight and will advance on the next tick.
    Running,
    /// A run is in flight but suspended.
    Paused,
    /// The reference string was exhausted.
    Completed,
    /// The run was stopped before exhausting the reference string.
    Cancelled,
}

impl RunState {
    /// True for the states a finished or abandoned run rests in.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// True while a run is in flight (running or paused).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Outcome of a single [`SimulationRunner::tick`].
#[derive(Debug)]
pub enum TickOutcome {
    /// One reference was processed. The runner may have transitioned to
    /// [`RunState::Completed`] if it was the last one.
    Stepped(StepResult),
    /// The reference string was already exhausted; the run completed without
    /// processing anything (only possible for an empty reference string).
    Completed(SimulationStatistics),
}

struct ActiveRun {
    policy: Box<dyn ReplacementPolicy>,
    reference: ReferenceString,
    cursor: usize,
}

/// Drives a reference string through a replacement policy one step at a time.
///
/// # Examples
///
/// ```
/// use framesim::{NullReporter, PolicyKind, ReferenceString, SimulationRunner};
///
/// let mut runner = SimulationRunner::new();
/// let refs = ReferenceString::parse("1 2 3 1 4").unwrap();
/// runner.start(PolicyKind::Fifo, 3, refs).unwrap();
///
/// let stats = runner.run_to_completion(&mut NullReporter).unwrap();
/// assert_eq!(stats.faults, 4);
/// assert_eq!(stats.hits, 1);
/// ```
pub struct SimulationRunner {
    state: RunState,
    frames: FrameTable,
    run: Option<ActiveRun>,
    statistics: SimulationStatistics,
}

impl SimulationRunner {
    /// Creates an idle runner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            // A placeholder table; start() builds the real one.
            frames: FrameTable::new(crate::frames::MIN_FRAME_COUNT)
                .unwrap_or_else(|_| unreachable!("MIN_FRAME_COUNT is in range")),
            run: None,
            statistics: SimulationStatistics::default(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Running totals as of the last completed step.
    #[must_use]
    pub const fn statistics(&self) -> SimulationStatistics {
        self.statistics
    }

    /// The frame table as of the last completed step.
    #[must_use]
    pub const fn frames(&self) -> &FrameTable {
        &self.frames
    }

    /// The algorithm of the current (or last) run, if one was started.
    #[must_use]
    pub fn policy_kind(&self) -> Option<PolicyKind> {
        self.run.as_ref().map(|run| run.policy.kind())
    }

    /// Index of the next reference to process.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.cursor)
    }

    /// Begins a new run.
    ///
    /// Valid from `Idle` and from the terminal states (restarting implicitly
    /// resets). Statistics are zeroed and the frame table rebuilt empty.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] while a run is in flight;
    /// [`crate::error::ConfigError::FrameCountOutOfRange`] for a bad frame
    /// count.
    pub fn start(
        &mut self,
        kind: PolicyKind,
        frame_count: usize,
        reference: ReferenceString,
    ) -> SimResult<()> {
        if self.state.is_active() {
            return Err(StateError::InvalidTransition {
                action: "start",
                state: self.state,
            }
            .into());
        }

        self.frames = FrameTable::new(frame_count).map_err(SimulatorError::from)?;
        self.statistics = SimulationStatistics::default();
        self.run = Some(ActiveRun {
            policy: kind.build(&reference),
            reference,
            cursor: 0,
        });
        self.state = RunState::Running;
        Ok(())
    }

    /// Suspends a running simulation. Table and statistics are untouched.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] unless the runner is `Running`.
    pub fn pause(&mut self) -> SimResult<()> {
        if self.state != RunState::Running {
            return Err(StateError::InvalidTransition {
                action: "pause",
                state: self.state,
            }
            .into());
        }
        self.state = RunState::Paused;
        Ok(())
    }

    /// Resumes a paused simulation.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] unless the runner is `Paused`.
    pub fn resume(&mut self) -> SimResult<()> {
        if self.state != RunState::Paused {
            return Err(StateError::InvalidTransition {
                action: "resume",
                state: self.state,
            }
            .into());
        }
        self.state = RunState::Running;
        Ok(())
    }

    /// Stops the current run cleanly.
    ///
    /// The frame table and statistics keep whatever state existed at the last
    /// completed step; no partial mutation is left behind.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] from `Idle`.
    pub fn cancel(&mut self) -> SimResult<()> {
        if self.state == RunState::Idle {
            return Err(StateError::InvalidTransition {
                action: "cancel",
                state: self.state,
            }
            .into());
        }
        self.state = RunState::Cancelled;
        Ok(())
    }

    /// Discards the run entirely and returns to `Idle`.
    ///
    /// Clears the frame table, statistics, and policy bookkeeping, and emits
    /// `on_reset`.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] from `Idle`.
    pub fn reset(&mut self, reporter: &mut dyn StepReporter) -> SimResult<()> {
        if self.state == RunState::Idle {
            return Err(StateError::InvalidTransition {
                action: "reset",
                state: self.state,
            }
            .into());
        }
        self.frames.clear();
        self.statistics = SimulationStatistics::default();
        self.run = None;
        self.state = RunState::Idle;
        reporter.on_reset();
        Ok(())
    }

    /// Processes exactly one reference.
    ///
    /// On a hit the policy's bookkeeping is refreshed; on a fault the page is
    /// placed in the first empty slot, or, with a full table, in the slot the
    /// policy selects after the victim is evicted. The step is published via
    /// `on_step` and `on_statistics`; exhausting the sequence transitions to
    /// `Completed` and publishes `on_completed`.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] unless the runner is `Running`;
    /// internal errors if policy bookkeeping and the table disagree.
    pub fn tick(&mut self, reporter: &mut dyn StepReporter) -> SimResult<TickOutcome> {
        if self.state != RunState::Running {
            return Err(StateError::InvalidTransition {
                action: "tick",
                state: self.state,
            }
            .into());
        }

        let run = self
            .run
            .as_mut()
            .ok_or_else(|| SimulatorError::internal("running without an active run"))?;

        let Some(page) = run.reference.get(run.cursor) else {
            self.state = RunState::Completed;
            reporter.on_completed(&self.statistics);
            return Ok(TickOutcome::Completed(self.statistics));
        };
        let index = run.cursor;

        let (access, evicted) = if self.frames.contains(page) {
            run.policy.record_access(page, index);
            (Access::Hit, None)
        } else if let Some(slot) = self.frames.first_empty_slot() {
            self.frames.occupy(slot, page);
            run.policy.record_access(page, index);
            (Access::Fault, None)
        } else {
            let slot = run.policy.select_victim(&self.frames, index)?;
            let victim = self.frames.page_at(slot).ok_or_else(|| {
                SimulatorError::internal(format!("policy selected empty slot {slot} as victim"))
            })?;
            run.policy.forget(victim);
            self.frames.occupy(slot, page);
            run.policy.record_access(page, index);
            (Access::Fault, Some(victim))
        };

        self.statistics.record(access);
        run.cursor += 1;

        let step = StepResult {
            index,
            page,
            access,
            evicted,
            frames: self.frames.snapshot(),
            statistics: self.statistics,
        };

        reporter.on_step(&step);
        reporter.on_statistics(&self.statistics);

        if run.cursor == run.reference.len() {
            self.state = RunState::Completed;
            reporter.on_completed(&self.statistics);
        }

        Ok(TickOutcome::Stepped(step))
    }

    /// Ticks until the run completes, for synchronous hosts and tests.
    ///
    /// # Errors
    ///
    /// Propagates the first [`tick`](Self::tick) failure.
    pub fn run_to_completion(
        &mut self,
        reporter: &mut dyn StepReporter,
    ) -> SimResult<SimulationStatistics> {
        while self.state == RunState::Running {
            self.tick(reporter)?;
        }
        Ok(self.statistics)
    }
}

impl Default for SimulationRunner {
    fn default() -> Self {
        Self::new()
    }
}
