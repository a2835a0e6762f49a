//! Discrete-time scheduling engine.
//!
//! Per tick, strictly in this order: deadline monitor, candidate selector,
//! execution step for the winner, invariant check, snapshot. Everything is
//! single-threaded and deterministic.

mod invariants;
mod lock;
mod metrics;
pub mod monitor;
pub mod selector;
mod simulation;
mod snapshot;
mod state;
mod task;

// Re-export core types for public API
pub use invariants::{
    DeadlineMonotonic, Invariant, InvariantViolation, LockOwnership, MissCounterMonotonic,
    RemainingTimeBounds, SuspensionRequiresResource, builtin_invariants,
};
pub use lock::ResourceLock;
pub use metrics::{SimulationReport, TaskReport};
pub use simulation::{DispatchOutcome, Simulation, SimulationError, execute_step};
pub use snapshot::{LockView, Snapshot, SnapshotSink, TaskTimeline, TaskView, TimelineMark};
pub use state::SimulationState;
pub use task::{Task, TaskId, TaskRegistry, TaskState, Tick};

#[cfg(test)]
mod tests;
