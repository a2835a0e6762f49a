//! Simulation-state aggregate passed to every scheduling component.

use super::lock::ResourceLock;
use super::task::{Task, TaskId, TaskRegistry, Tick};
use crate::config::SimulationConfig;

/// Everything the scheduling components read and mutate during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationState {
    /// Tick currently being processed
    pub current_time: Tick,
    /// Fixed task set
    pub tasks: TaskRegistry,
    /// Shared resource
    pub lock: ResourceLock,
}

impl SimulationState {
    /// Creates the initial state at tick 0 with a free lock.
    ///
    /// The configuration is assumed to be validated.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            current_time: 0,
            tasks: TaskRegistry::from_specs(&config.tasks),
            lock: ResourceLock::new(),
        }
    }

    /// Looks up a task by identity.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }
}
