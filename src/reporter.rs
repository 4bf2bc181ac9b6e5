//! The observer boundary between the engine and a host.
//!
//! The runner publishes every step through a `StepReporter`. Reporters are
//! read-only observers: they must not reach back into the engine. Hosts that
//! render (a grid of frame cells, a statistics panel, a voice line) implement
//! this trait; headless hosts use [`NullReporter`] or the channel-backed
//! publisher in [`crate::driver`].

use crate::step::{SimulationStatistics, StepResult};

/// Receives per-step updates from a simulation run.
///
/// All methods default to no-ops so implementations subscribe only to what
/// they render.
pub trait StepReporter: Send {
    /// One reference was processed.
    fn on_step(&mut self, _step: &StepResult) {}

    /// Running totals changed (called once per step, after `on_step`).
    fn on_statistics(&mut self, _statistics: &SimulationStatistics) {}

    /// The reference string was exhausted; `statistics` is final.
    fn on_completed(&mut self, _statistics: &SimulationStatistics) {}

    /// The runner was reset to idle; any rendered state is stale.
    fn on_reset(&mut self) {}
}

/// A reporter that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl StepReporter for NullReporter {}
