//! Simulation events and the consumer-side stream.
//!
//! The threaded driver publishes one event per reporter callback into a
//! bounded channel. Events carry the id of the run that produced them so a
//! consumer can discard stragglers from a run that was cancelled and
//! superseded.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SimResult, StateError};
use crate::step::{SimulationStatistics, StepResult};

/// Unique identifier for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a fresh run id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// One reference was processed.
    Step {
        /// The full step record.
        result: StepResult,
    },
    /// Running totals changed.
    Statistics {
        /// Totals as of the latest step.
        statistics: SimulationStatistics,
    },
    /// The run finished; `statistics` is final.
    Completed {
        /// Final totals.
        statistics: SimulationStatistics,
    },
    /// The run was stopped before completion.
    Cancelled {
        /// Totals as of the last completed step.
        statistics: SimulationStatistics,
    },
    /// The runner was reset to idle.
    Reset,
}

/// An event published by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// The run this event belongs to.
    pub run: RunId,
    /// What happened.
    pub payload: EventPayload,
}

/// Consumer end of a driver's event channel.
///
/// The publisher never blocks: when this stream's buffer is full, events are
/// dropped and counted on the driver side. Once the driver is gone the stream
/// reports [`StateError::Disconnected`] after draining.
#[derive(Debug)]
pub struct EventStream {
    rx: Receiver<SimulationEvent>,
}

impl EventStream {
    pub(crate) fn new(rx: Receiver<SimulationEvent>) -> Self {
        Self { rx }
    }

    /// Receives the next event, blocking until one arrives.
    ///
    /// # Errors
    ///
    /// [`StateError::Disconnected`] when the driver is gone and the buffer is
    /// drained.
    pub fn recv(&self) -> SimResult<SimulationEvent> {
        self.rx.recv().map_err(|_| {
            StateError::Disconnected {
                path: "event_stream".to_string(),
            }
            .into()
        })
    }

    /// Receives the next event, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// [`StateError::Timeout`] on expiry, [`StateError::Disconnected`] when
    /// the driver is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> SimResult<SimulationEvent> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => StateError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
            .into(),
            RecvTimeoutError::Disconnected => StateError::Disconnected {
                path: "event_stream".to_string(),
            }
            .into(),
        })
    }

    /// Receives an event if one is already buffered.
    ///
    /// # Errors
    ///
    /// [`StateError::Disconnected`] when the driver is gone and the buffer is
    /// drained; `Ok(None)` when the buffer is merely empty.
    pub fn try_recv(&self) -> SimResult<Option<SimulationEvent>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(StateError::Disconnected {
                path: "event_stream".to_string(),
            }
            .into()),
        }
    }
}
