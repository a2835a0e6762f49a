//! Rtsim Core - Discrete-time fixed-priority scheduler simulation
//!
//! This crate models a run-to-completion real-time scheduler guarding one
//! shared binary resource. Time advances in integer ticks; every tick runs
//! the deadline monitor, the candidate selector and at most one execution
//! step, then emits an immutable snapshot for external renderers.
//!
//! # Example
//!
//! ```rust
//! use rtsim_core::{Simulation, SimulationConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sim = Simulation::new(SimulationConfig::reference())?;
//! let mut snapshots = Vec::new();
//! let report = sim.run(&mut snapshots)?;
//!
//! assert_eq!(snapshots.len(), 20);
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]

pub mod config;
pub mod scheduler;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{ConfigError, SimulationConfig, TaskSpec};
pub use scheduler::{
    Invariant, InvariantViolation, LockView, ResourceLock, Simulation, SimulationError,
    SimulationReport, SimulationState, Snapshot, SnapshotSink, Task, TaskId, TaskRegistry,
    TaskReport, TaskState, TaskTimeline, TaskView, Tick, TimelineMark,
};

/// Errors that can bubble up from any rtsim subsystem.
#[derive(Debug, thiserror::Error)]
pub enum RtsimError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Simulation aborted.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// I/O failure outside configuration loading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RtsimError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            RtsimError::Config(e) => format!("Invalid configuration: {e}"),
            RtsimError::Simulation(SimulationError::InvalidConfig(e)) => {
                format!("Invalid configuration: {e}")
            }
            RtsimError::Simulation(SimulationError::InvariantViolated(violation)) => {
                format!("Internal scheduling fault: {violation}")
            }
            RtsimError::Simulation(SimulationError::HorizonExhausted { horizon }) => {
                format!("Simulation already finished after {horizon} ticks")
            }
            RtsimError::Io(e) => format!("File system error: {e}"),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RtsimError::Config(_) | RtsimError::Simulation(SimulationError::InvalidConfig(_))
        )
    }
}

/// Result alias for rtsim operations.
pub type Result<T> = std::result::Result<T, RtsimError>;
