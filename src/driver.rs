//! Timed, pausable driver for a simulation runner.
//!
//! The runner itself is synchronous; this module provides the host most
//! applications want: a dedicated worker thread that advances one reference
//! per tick, sleeps a configurable delay between ticks, and accepts commands
//! over a bounded control channel. Because the inter-tick sleep *is* a wait on
//! the control channel, pause/resume/cancel/reset and a superseding start are
//! all observable at the suspension point at the latest.
//!
//! Events are published with a non-blocking `try_send`; a slow consumer drops
//! events (counted, queryable) and never stalls the simulation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::error::{SimResult, StateError};
use crate::event::{EventPayload, EventStream, RunId, SimulationEvent};
use crate::policy::PolicyKind;
use crate::reference::ReferenceString;
use crate::reporter::StepReporter;
use crate::runner::{RunState, SimulationRunner};
use crate::step::{SimulationStatistics, StepResult};

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Delay between processed references. One second matches the reference
    /// pacing hosts render at; tests shrink it to near zero.
    pub step_delay: Duration,
    /// Event stream buffer capacity before events are dropped.
    pub event_capacity: usize,
    /// Control queue capacity.
    pub control_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_secs(1),
            event_capacity: 1024,
            control_capacity: 64,
        }
    }
}

/// Everything needed to begin a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Which replacement algorithm to simulate.
    pub algorithm: PolicyKind,
    /// Number of physical frames (1–7).
    pub frame_count: usize,
    /// The parsed reference string.
    pub reference: ReferenceString,
}

enum Command {
    Start {
        request: RunRequest,
        reply: Sender<SimResult<RunId>>,
    },
    Pause {
        reply: Sender<SimResult<()>>,
    },
    Resume {
        reply: Sender<SimResult<()>>,
    },
    Cancel {
        reply: Sender<SimResult<()>>,
    },
    Reset {
        reply: Sender<SimResult<()>>,
    },
    State {
        reply: Sender<RunState>,
    },
}

/// Publishes reporter callbacks as events, tagged with the current run.
struct EventPublisher {
    tx: Sender<SimulationEvent>,
    run: RunId,
    dropped: Arc<AtomicU64>,
}

impl EventPublisher {
    fn publish(&self, payload: EventPayload) {
        let event = SimulationEvent {
            run: self.run,
            payload,
        };
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl StepReporter for EventPublisher {
    fn on_step(&mut self, step: &StepResult) {
        self.publish(EventPayload::Step {
            result: step.clone(),
        });
    }

    fn on_statistics(&mut self, statistics: &SimulationStatistics) {
        self.publish(EventPayload::Statistics {
            statistics: *statistics,
        });
    }

    fn on_completed(&mut self, statistics: &SimulationStatistics) {
        self.publish(EventPayload::Completed {
            statistics: *statistics,
        });
    }

    fn on_reset(&mut self) {
        self.publish(EventPayload::Reset);
    }
}

/// A worker thread that owns a [`SimulationRunner`] and paces it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use framesim::{DriverConfig, EventPayload, PolicyKind, ReferenceString, RunRequest, SimulationDriver};
///
/// let config = DriverConfig {
///     step_delay: Duration::from_millis(1),
///     ..DriverConfig::default()
/// };
/// let (driver, events) = SimulationDriver::spawn(config);
///
/// driver
///     .start(RunRequest {
///         algorithm: PolicyKind::Fifo,
///         frame_count: 3,
///         reference: ReferenceString::parse("1 2 3 4 1 2 5").unwrap(),
///     })
///     .unwrap();
///
/// loop {
///     let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
///     if let EventPayload::Completed { statistics } = event.payload {
///         assert_eq!(statistics.faults, 7);
///         break;
///     }
/// }
/// ```
pub struct SimulationDriver {
    control_tx: Sender<Command>,
    dropped_events: Arc<AtomicU64>,
    join: Option<JoinHandle<()>>,
}

impl SimulationDriver {
    /// Spawns the worker thread and returns the driver plus its event stream.
    #[must_use]
    pub fn spawn(config: DriverConfig) -> (Self, EventStream) {
        let (control_tx, control_rx) = bounded::<Command>(config.control_capacity.max(1));
        let (event_tx, event_rx) = bounded::<SimulationEvent>(config.event_capacity.max(1));
        let dropped_events = Arc::new(AtomicU64::new(0));

        let worker_dropped = Arc::clone(&dropped_events);
        let join = thread::Builder::new()
            .name("framesim-driver".to_string())
            .spawn(move || worker_loop(&config, &control_rx, event_tx, &worker_dropped))
            .expect("failed to spawn framesim driver");

        let driver = Self {
            control_tx,
            dropped_events,
            join: Some(join),
        };
        (driver, EventStream::new(event_rx))
    }

    /// Begins a run, implicitly cancelling any run in flight.
    ///
    /// # Errors
    ///
    /// Configuration errors from the runner, or
    /// [`StateError::Disconnected`] if the worker is gone.
    pub fn start(&self, request: RunRequest) -> SimResult<RunId> {
        self.rendezvous(|reply| Command::Start { request, reply })?
    }

    /// Suspends the run at the next suspension point.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] unless running.
    pub fn pause(&self) -> SimResult<()> {
        self.rendezvous(|reply| Command::Pause { reply })?
    }

    /// Resumes a paused run.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] unless paused.
    pub fn resume(&self) -> SimResult<()> {
        self.rendezvous(|reply| Command::Resume { reply })?
    }

    /// Stops the run; table and statistics keep the last completed step.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] when idle.
    pub fn cancel(&self) -> SimResult<()> {
        self.rendezvous(|reply| Command::Cancel { reply })?
    }

    /// Discards all run state and returns the runner to idle.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] when idle.
    pub fn reset(&self) -> SimResult<()> {
        self.rendezvous(|reply| Command::Reset { reply })?
    }

    /// The runner's current lifecycle state.
    ///
    /// # Errors
    ///
    /// [`StateError::Disconnected`] if the worker is gone.
    pub fn state(&self) -> SimResult<RunState> {
        self.rendezvous(|reply| Command::State { reply })
    }

    /// Events dropped because the consumer fell behind.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    fn rendezvous<T>(&self, build: impl FnOnce(Sender<T>) -> Command) -> SimResult<T> {
        let disconnected = || StateError::Disconnected {
            path: "driver_control".to_string(),
        };

        let (reply_tx, reply_rx) = bounded::<T>(1);
        self.control_tx
            .send(build(reply_tx))
            .map_err(|_| disconnected())?;
        reply_rx.recv().map_err(|_| disconnected().into())
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        // Close the control channel so the worker exits, then join. The
        // worker observes disconnection even while sleeping between ticks.
        let (dummy_tx, _) = bounded::<Command>(1);
        drop(std::mem::replace(&mut self.control_tx, dummy_tx));

        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    config: &DriverConfig,
    control_rx: &Receiver<Command>,
    event_tx: Sender<SimulationEvent>,
    dropped: &Arc<AtomicU64>,
) {
    let mut runner = SimulationRunner::new();
    let mut publisher = EventPublisher {
        tx: event_tx,
        run: RunId::new(),
        dropped: Arc::clone(dropped),
    };

    loop {
        if runner.state() == RunState::Running {
            if runner.tick(&mut publisher).is_err() {
                // Internal inconsistency: stop the run rather than loop on it.
                let _ = runner.cancel();
                publisher.publish(EventPayload::Cancelled {
                    statistics: runner.statistics(),
                });
            }

            // The suspension point: one per processed reference.
            match control_rx.recv_timeout(config.step_delay) {
                Ok(command) => handle_command(command, &mut runner, &mut publisher),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            // Idle, paused, or finished: nothing to do until the host speaks.
            match control_rx.recv() {
                Ok(command) => handle_command(command, &mut runner, &mut publisher),
                Err(_) => break,
            }
        }
    }
}

fn handle_command(
    command: Command,
    runner: &mut SimulationRunner,
    publisher: &mut EventPublisher,
) {
    match command {
        Command::Start { request, reply } => {
            if runner.state().is_active() {
                // A new run supersedes the current one.
                let _ = runner.cancel();
                publisher.publish(EventPayload::Cancelled {
                    statistics: runner.statistics(),
                });
            }

            let run_id = RunId::new();
            let result = runner
                .start(request.algorithm, request.frame_count, request.reference)
                .map(|()| {
                    publisher.run = run_id;
                    run_id
                });
            let _ = reply.send(result);
        }
        Command::Pause { reply } => {
            let _ = reply.send(runner.pause());
        }
        Command::Resume { reply } => {
            let _ = reply.send(runner.resume());
        }
        Command::Cancel { reply } => {
            let result = runner.cancel();
            if result.is_ok() {
                publisher.publish(EventPayload::Cancelled {
                    statistics: runner.statistics(),
                });
            }
            let _ = reply.send(result);
        }
        Command::Reset { reply } => {
            let _ = reply.send(runner.reset(publisher));
        }
        Command::State { reply } => {
            let _ = reply.send(runner.state());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageId;

    const WAIT: Duration = Duration::from_secs(5);

    fn fast_driver() -> (SimulationDriver, EventStream) {
        SimulationDriver::spawn(DriverConfig {
            step_delay: Duration::from_millis(1),
            ..DriverConfig::default()
        })
    }

    fn request(algorithm: PolicyKind, frame_count: usize, pages: &[i64]) -> RunRequest {
        RunRequest {
            algorithm,
            frame_count,
            reference: ReferenceString::from_pages(pages.iter().copied().map(PageId::new)),
        }
    }

    #[test]
    fn runs_to_completion_and_streams_ordered_steps() {
        let (driver, events) = fast_driver();
        let run = driver
            .start(request(PolicyKind::Fifo, 3, &[1, 2, 3, 4, 1, 2, 5]))
            .unwrap();

        let mut step_indices = Vec::new();
        let final_stats = loop {
            let event = events.recv_timeout(WAIT).unwrap();
            assert_eq!(event.run, run);
            match event.payload {
                EventPayload::Step { result } => step_indices.push(result.index),
                EventPayload::Completed { statistics } => break statistics,
                EventPayload::Statistics { .. } => {}
                other => panic!("unexpected event: {other:?}"),
            }
        };

        assert_eq!(step_indices, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(final_stats.faults, 7);
        assert_eq!(final_stats.hits, 0);
        assert_eq!(driver.state().unwrap(), RunState::Completed);
        assert_eq!(driver.dropped_events(), 0);
    }

    #[test]
    fn pause_blocks_progress_until_resume() {
        let (driver, events) = SimulationDriver::spawn(DriverConfig {
            step_delay: Duration::from_millis(5),
            ..DriverConfig::default()
        });
        driver
            .start(request(PolicyKind::Lru, 2, &[1, 2, 3, 4, 5, 6, 7, 8]))
            .unwrap();

        driver.pause().unwrap();
        assert_eq!(driver.state().unwrap(), RunState::Paused);

        // Drain whatever was produced before the pause took effect, then
        // verify no further steps arrive while paused.
        while events.recv_timeout(Duration::from_millis(50)).is_ok() {}
        assert!(events.recv_timeout(Duration::from_millis(50)).is_err());

        driver.resume().unwrap();
        let event = events.recv_timeout(WAIT).unwrap();
        assert!(matches!(
            event.payload,
            EventPayload::Step { .. } | EventPayload::Statistics { .. }
        ));
    }

    #[test]
    fn cancel_stops_mid_run_and_reports() {
        let (driver, events) = SimulationDriver::spawn(DriverConfig {
            step_delay: Duration::from_millis(5),
            ..DriverConfig::default()
        });
        driver
            .start(request(PolicyKind::Fifo, 2, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]))
            .unwrap();

        driver.cancel().unwrap();
        assert_eq!(driver.state().unwrap(), RunState::Cancelled);

        let mut saw_cancelled = false;
        while let Ok(event) = events.recv_timeout(Duration::from_millis(100)) {
            if let EventPayload::Cancelled { statistics } = event.payload {
                assert_eq!(
                    statistics.hits + statistics.faults,
                    statistics.references_processed
                );
                saw_cancelled = true;
            }
        }
        assert!(saw_cancelled);
    }

    #[test]
    fn starting_again_supersedes_the_current_run() {
        let (driver, events) = SimulationDriver::spawn(DriverConfig {
            step_delay: Duration::from_millis(5),
            ..DriverConfig::default()
        });
        let first = driver
            .start(request(PolicyKind::Fifo, 2, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]))
            .unwrap();
        let second = driver.start(request(PolicyKind::Mru, 2, &[1, 2])).unwrap();
        assert_ne!(first, second);

        // The old run is cancelled and the new one completes.
        let mut saw_cancelled_first = false;
        loop {
            let event = events.recv_timeout(WAIT).unwrap();
            match event.payload {
                EventPayload::Cancelled { .. } if event.run == first => {
                    saw_cancelled_first = true;
                }
                EventPayload::Completed { statistics } => {
                    assert_eq!(event.run, second);
                    assert_eq!(statistics.references_processed, 2);
                    break;
                }
                _ => {}
            }
        }
        assert!(saw_cancelled_first);
    }

    #[test]
    fn command_errors_cross_the_boundary() {
        let (driver, _events) = fast_driver();

        assert!(driver.pause().unwrap_err().is_state());
        assert!(driver.reset().unwrap_err().is_state());

        let err = driver
            .start(request(PolicyKind::Fifo, 9, &[1, 2]))
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(driver.state().unwrap(), RunState::Idle);
    }

    #[test]
    fn reset_emits_reset_event() {
        let (driver, events) = fast_driver();
        let run = driver.start(request(PolicyKind::Lfu, 2, &[1, 2])).unwrap();

        loop {
            let event = events.recv_timeout(WAIT).unwrap();
            if matches!(event.payload, EventPayload::Completed { .. }) {
                break;
            }
        }

        driver.reset().unwrap();
        loop {
            let event = events.recv_timeout(WAIT).unwrap();
            if matches!(event.payload, EventPayload::Reset) {
                assert_eq!(event.run, run);
                break;
            }
        }
        assert_eq!(driver.state().unwrap(), RunState::Idle);
    }
}
