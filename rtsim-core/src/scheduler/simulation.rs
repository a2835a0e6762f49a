//! Tick scheduler: orchestrates monitor, selection and execution per tick.

use thiserror::Error;
use tracing::{debug, error, info, trace};

use super::invariants::{Invariant, InvariantViolation, builtin_invariants};
use super::metrics::{SimulationMetrics, SimulationReport};
use super::monitor;
use super::selector;
use super::snapshot::{Snapshot, SnapshotSink, TimelineRecorder};
use super::state::SimulationState;
use super::task::{TaskId, TaskState, Tick};
use crate::config::{ConfigError, SimulationConfig};

/// Errors that can occur during simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration rejected before any state was built
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Scheduling logic produced an impossible state; the run is dead
    #[error("{0}")]
    InvariantViolated(InvariantViolation),

    /// Stepped after the final tick
    #[error("Simulation horizon of {horizon} ticks already exhausted")]
    HorizonExhausted {
        /// Configured horizon
        horizon: Tick,
    },
}

/// Effect of the execution step on the selected task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Task consumed one tick and keeps running
    Started,
    /// Task consumed its last tick and is now Waiting
    Completed,
    /// Task could not take the lock and is now Suspended
    Blocked,
}

/// Runs the execution step for the selected task at `state.current_time`.
///
/// # Errors
///
/// - `InvariantViolation` - The task identity is unknown, or the task had
///   no work to consume after initialization
pub fn execute_step(
    state: &mut SimulationState,
    id: TaskId,
) -> Result<DispatchOutcome, InvariantViolation> {
    let now = state.current_time;
    let Some(task) = state.tasks.get_mut(id) else {
        return Err(InvariantViolation::new(
            "KnownTask",
            now,
            format!("selected task {id} is not registered"),
        ));
    };

    task.state = TaskState::Running;
    if task.needs_resource() && !state.lock.acquire(id) {
        task.state = TaskState::Suspended;
        return Ok(DispatchOutcome::Blocked);
    }

    if task.remaining_time == 0 {
        task.remaining_time = task.execution_time();
    }

    let remaining = task.consume_tick().ok_or_else(|| {
        InvariantViolation::new(
            "RemainingTimeBounds",
            now,
            format!("task {id} dispatched with zero execution time"),
        )
    })?;

    if remaining == 0 {
        task.complete_activation(now, &mut state.lock);
        return Ok(DispatchOutcome::Completed);
    }

    Ok(DispatchOutcome::Started)
}

/// Deterministic run-to-completion scheduler simulation.
///
/// Owns the simulation-state aggregate and steps it through ticks
/// `0..horizon`. Identical configurations always produce identical
/// snapshot sequences and reports.
pub struct Simulation {
    /// Number of ticks to run
    horizon: Tick,
    /// Next tick to process
    next_tick: Tick,
    /// Tasks, lock and current time
    state: SimulationState,
    /// Timeline history for snapshots
    timeline: TimelineRecorder,
    /// Metrics collector
    metrics: SimulationMetrics,
    /// Checked after every tick
    invariants: Vec<Box<dyn Invariant>>,
    /// First violation seen; the simulation refuses to continue after it
    fault: Option<InvariantViolation>,
}

impl Simulation {
    /// Creates a simulation from a configuration.
    ///
    /// # Errors
    /// - `SimulationError::InvalidConfig` - Configuration failed validation
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let state = SimulationState::new(&config);
        let timeline = TimelineRecorder::new(&state, config.display_window);
        info!(
            tasks = config.tasks.len(),
            horizon = config.horizon,
            utilization = config.total_utilization(),
            "simulation initialized"
        );

        Ok(Self {
            horizon: config.horizon,
            next_tick: 0,
            metrics: SimulationMetrics::new(config.tasks.len()),
            state,
            timeline,
            invariants: builtin_invariants(),
            fault: None,
        })
    }

    /// Adds an invariant checked after every tick.
    pub fn add_invariant(&mut self, invariant: Box<dyn Invariant>) {
        self.invariants.push(invariant);
    }

    /// Configured tick horizon.
    pub fn horizon(&self) -> Tick {
        self.horizon
    }

    /// Number of ticks processed so far.
    pub fn ticks_processed(&self) -> Tick {
        self.next_tick
    }

    /// True once every tick up to the horizon has been processed.
    pub fn is_finished(&self) -> bool {
        self.next_tick >= self.horizon
    }

    /// Read access to the settled simulation state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Report for the ticks processed so far.
    pub fn report(&self) -> SimulationReport {
        SimulationReport::build(self.horizon, &self.state, &self.metrics)
    }

    /// Processes one tick and returns its snapshot.
    ///
    /// # Errors
    /// - `SimulationError::HorizonExhausted` - Every tick was already processed
    /// - `SimulationError::InvariantViolated` - The tick produced an impossible
    ///   state; no snapshot is emitted and later calls keep failing
    pub fn step(&mut self) -> Result<Snapshot, SimulationError> {
        if let Some(violation) = &self.fault {
            return Err(SimulationError::InvariantViolated(violation.clone()));
        }
        if self.is_finished() {
            return Err(SimulationError::HorizonExhausted {
                horizon: self.horizon,
            });
        }

        let previous = self.state.clone();
        self.state.current_time = self.next_tick;

        let worked = match self.run_tick(&previous) {
            Ok(worked) => worked,
            Err(violation) => {
                error!(%violation, "scheduler invariant violated");
                self.fault = Some(violation.clone());
                return Err(SimulationError::InvariantViolated(violation));
            }
        };

        self.next_tick += 1;
        self.timeline.record(&self.state, &worked);
        trace!(tick = self.state.current_time, state = ?self.state, "tick settled");

        Ok(self.timeline.snapshot(&self.state))
    }

    /// Runs every remaining tick, handing each snapshot to `sink`.
    ///
    /// # Errors
    /// - `SimulationError::InvariantViolated` - A tick produced an impossible state
    pub fn run<S>(&mut self, sink: &mut S) -> Result<SimulationReport, SimulationError>
    where
        S: SnapshotSink + ?Sized,
    {
        while !self.is_finished() {
            let snapshot = self.step()?;
            sink.observe(&snapshot);
        }

        let report = self.report();
        info!(
            ticks = report.ticks_executed,
            idle_ticks = report.idle_ticks,
            missed_deadlines = report.total_missed_deadlines(),
            "simulation complete"
        );
        Ok(report)
    }

    /// Runs every remaining tick, discarding snapshots.
    ///
    /// # Errors
    /// - `SimulationError::InvariantViolated` - A tick produced an impossible state
    pub fn run_to_completion(&mut self) -> Result<SimulationReport, SimulationError> {
        self.run(&mut DiscardSnapshots)
    }

    /// Monitor, select, execute, then check invariants.
    ///
    /// Returns the tasks that consumed a tick of work.
    fn run_tick(&mut self, previous: &SimulationState) -> Result<Vec<TaskId>, InvariantViolation> {
        let now = self.state.current_time;

        let monitored = monitor::advance(&mut self.state)?;
        let mut worked = monitored.worked;
        for &task in &monitored.completed {
            self.metrics.record_completion(task);
        }

        let selection = selector::select_candidate(&mut self.state);
        for &task in &selection.suspended {
            self.metrics.record_suspension(task);
        }

        match selection.winner {
            Some(task) => {
                let outcome = execute_step(&mut self.state, task)?;
                debug!(tick = now, task = %task, ?outcome, "dispatched");
                match outcome {
                    DispatchOutcome::Started => {
                        self.metrics.record_dispatch(task);
                        worked.push(task);
                    }
                    DispatchOutcome::Completed => {
                        self.metrics.record_dispatch(task);
                        self.metrics.record_completion(task);
                        worked.push(task);
                    }
                    DispatchOutcome::Blocked => self.metrics.record_suspension(task),
                }
            }
            None => debug!(tick = now, "idle tick"),
        }
        self.metrics.record_tick(selection.winner.is_some());

        for invariant in &self.invariants {
            invariant.check(previous, &self.state)?;
        }
        Ok(worked)
    }
}

/// Sink that drops every snapshot.
struct DiscardSnapshots;

impl SnapshotSink for DiscardSnapshots {
    fn observe(&mut self, _snapshot: &Snapshot) {}
}
