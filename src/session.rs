//! Host-facing command surface.
//!
//! `SimulatorSession` is the facade a UI panel or a voice-intent dispatcher
//! calls: select an algorithm by name, set the frame count, hand over the raw
//! reference text, then run/pause/reset. Every command returns a result;
//! nothing is thrown across this boundary and nothing falls back silently.

use crate::driver::{DriverConfig, RunRequest, SimulationDriver};
use crate::error::{ConfigError, SimResult, SimulatorError, StateError};
use crate::event::{EventStream, RunId};
use crate::frames::{MAX_FRAME_COUNT, MIN_FRAME_COUNT};
use crate::policy::PolicyKind;
use crate::reference::ReferenceString;
use crate::runner::RunState;

/// Frame count used until the host sets one.
pub const DEFAULT_FRAME_COUNT: usize = 3;

/// Pending configuration plus a driver to run it on.
pub struct SimulatorSession {
    driver: SimulationDriver,
    algorithm: Option<PolicyKind>,
    frame_count: usize,
    reference: Option<ReferenceString>,
}

impl SimulatorSession {
    /// Creates a session with its own driver thread.
    #[must_use]
    pub fn new(config: DriverConfig) -> (Self, EventStream) {
        let (driver, events) = SimulationDriver::spawn(config);
        let session = Self {
            driver,
            algorithm: None,
            frame_count: DEFAULT_FRAME_COUNT,
            reference: None,
        };
        (session, events)
    }

    /// Selects the replacement algorithm by host command name.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownAlgorithm`] for unrecognized names; a typo never
    /// selects a different algorithm.
    pub fn set_algorithm(&mut self, name: &str) -> SimResult<PolicyKind> {
        let kind: PolicyKind = name.parse().map_err(SimulatorError::from)?;
        self.algorithm = Some(kind);
        Ok(kind)
    }

    /// Sets the number of physical frames for subsequent runs.
    ///
    /// # Errors
    ///
    /// [`ConfigError::FrameCountOutOfRange`] outside 1–7.
    pub fn set_frame_count(&mut self, frame_count: usize) -> SimResult<()> {
        if !(MIN_FRAME_COUNT..=MAX_FRAME_COUNT).contains(&frame_count) {
            return Err(ConfigError::FrameCountOutOfRange { value: frame_count }.into());
        }
        self.frame_count = frame_count;
        Ok(())
    }

    /// Parses and stores the reference string, returning the number of
    /// malformed tokens that were skipped so the host can warn the user.
    ///
    /// # Errors
    ///
    /// [`crate::error::ParseError::NoUsableTokens`] when nothing parses.
    pub fn process_reference_string(&mut self, text: &str) -> SimResult<usize> {
        let reference = ReferenceString::parse(text).map_err(SimulatorError::from)?;
        let skipped = reference.skipped_tokens();
        self.reference = Some(reference);
        Ok(skipped)
    }

    /// Starts a run with the session's configuration, superseding any run in
    /// flight.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoAlgorithmSelected`] or
    /// [`ConfigError::MissingReferenceString`] when configuration is
    /// incomplete.
    pub fn run(&self) -> SimResult<RunId> {
        let algorithm = self.algorithm.ok_or(ConfigError::NoAlgorithmSelected)?;
        let reference = self
            .reference
            .clone()
            .ok_or(ConfigError::MissingReferenceString)?;

        self.driver.start(RunRequest {
            algorithm,
            frame_count: self.frame_count,
            reference,
        })
    }

    /// Pauses a running simulation or resumes a paused one.
    ///
    /// Returns `true` when the simulation is paused afterwards.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] when no run is in flight.
    pub fn toggle_pause(&self) -> SimResult<bool> {
        match self.driver.state()? {
            RunState::Running => {
                self.driver.pause()?;
                Ok(true)
            }
            RunState::Paused => {
                self.driver.resume()?;
                Ok(false)
            }
            state => Err(StateError::InvalidTransition {
                action: "toggle pause",
                state,
            }
            .into()),
        }
    }

    /// Discards the current run and its rendered state.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] when the runner is already idle.
    pub fn reset(&self) -> SimResult<()> {
        self.driver.reset()
    }

    /// The runner's current lifecycle state.
    ///
    /// # Errors
    ///
    /// [`StateError::Disconnected`] if the driver worker is gone.
    pub fn state(&self) -> SimResult<RunState> {
        self.driver.state()
    }

    /// The selected algorithm, if any.
    #[must_use]
    pub const fn algorithm(&self) -> Option<PolicyKind> {
        self.algorithm
    }

    /// The configured frame count.
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// The most recently parsed reference string, if any.
    #[must_use]
    pub const fn reference(&self) -> Option<&ReferenceString> {
        self.reference.as_ref()
    }

    /// The underlying driver, for hosts that need direct control.
    #[must_use]
    pub const fn driver(&self) -> &SimulationDriver {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::event::EventPayload;

    fn fast_session() -> (SimulatorSession, EventStream) {
        SimulatorSession::new(DriverConfig {
            step_delay: Duration::from_millis(1),
            ..DriverConfig::default()
        })
    }

    #[test]
    fn defaults_and_accessors() {
        let (session, _events) = fast_session();
        assert_eq!(session.frame_count(), DEFAULT_FRAME_COUNT);
        assert_eq!(session.algorithm(), None);
        assert!(session.reference().is_none());
    }

    #[test]
    fn rejects_unknown_algorithm_names() {
        let (mut session, _events) = fast_session();
        let err = session.set_algorithm("SECOND-CHANCE").unwrap_err();
        assert!(err.is_config());
        assert_eq!(session.algorithm(), None);
    }

    #[test]
    fn rejects_out_of_range_frame_counts() {
        let (mut session, _events) = fast_session();
        assert!(session.set_frame_count(0).unwrap_err().is_config());
        assert!(session.set_frame_count(8).unwrap_err().is_config());
        session.set_frame_count(7).unwrap();
        assert_eq!(session.frame_count(), 7);
    }

    #[test]
    fn surfaces_skipped_token_count() {
        let (mut session, _events) = fast_session();
        let skipped = session.process_reference_string("1 x 2 y 3").unwrap();
        assert_eq!(skipped, 2);
        assert_eq!(session.reference().unwrap().len(), 3);
    }

    #[test]
    fn run_requires_algorithm_and_reference() {
        let (mut session, _events) = fast_session();
        assert!(matches!(
            session.run().unwrap_err(),
            crate::error::SimulatorError::Config(ConfigError::NoAlgorithmSelected)
        ));

        session.set_algorithm("FIFO").unwrap();
        assert!(matches!(
            session.run().unwrap_err(),
            crate::error::SimulatorError::Config(ConfigError::MissingReferenceString)
        ));

        session.process_reference_string("1 2 3").unwrap();
        session.run().unwrap();
    }

    #[test]
    fn full_command_sequence_completes() {
        let (mut session, events) = fast_session();
        session.set_algorithm("lru").unwrap();
        session.set_frame_count(3).unwrap();
        session.process_reference_string("1 2 3 1 4").unwrap();
        let run = session.run().unwrap();

        loop {
            let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(event.run, run);
            if let EventPayload::Completed { statistics } = event.payload {
                assert_eq!(statistics.faults, 4);
                assert_eq!(statistics.hits, 1);
                break;
            }
        }
    }

    #[test]
    fn toggle_pause_round_trips() {
        let (mut session, _events) = SimulatorSession::new(DriverConfig {
            step_delay: Duration::from_millis(10),
            ..DriverConfig::default()
        });
        assert!(session.toggle_pause().unwrap_err().is_state());

        session.set_algorithm("FIFO").unwrap();
        session
            .process_reference_string("1 2 3 4 5 6 7 8 9 10 11 12")
            .unwrap();
        session.run().unwrap();

        assert!(session.toggle_pause().unwrap());
        assert_eq!(session.state().unwrap(), RunState::Paused);
        assert!(!session.toggle_pause().unwrap());
    }
}
