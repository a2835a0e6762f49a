//! Centralized configuration for rtsim.
//!
//! The task set and tick horizon are injected here instead of being
//! hard-coded in the scheduler. Configurations are plain JSON documents
//! and are validated once, before any simulation state exists.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of ticks simulated per run.
pub const DEFAULT_HORIZON: u64 = 20;

/// Default number of leading ticks recorded for timeline rendering.
pub const DEFAULT_DISPLAY_WINDOW: u64 = 20;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No tasks were supplied
    #[error("Task set is empty")]
    EmptyTaskSet,

    /// Horizon must cover at least one tick
    #[error("Tick horizon must be at least 1")]
    NonPositiveHorizon,

    /// Timeline window must cover at least one tick
    #[error("Display window must be at least 1")]
    ZeroDisplayWindow,

    /// Task period is zero
    #[error("Task {task}: period must be at least 1, got {period}")]
    NonPositivePeriod {
        /// Position of the task in the configured list
        task: usize,
        /// Offending period
        period: u64,
    },

    /// Deadlines of this task would overflow the tick counter within the horizon
    #[error("Task {task}: period {period} is too large for horizon {horizon}")]
    PeriodTooLarge {
        /// Position of the task in the configured list
        task: usize,
        /// Offending period
        period: u64,
        /// Configured horizon
        horizon: u64,
    },

    /// Task execution time is zero
    #[error("Task {task}: execution time must be at least 1")]
    NonPositiveExecutionTime {
        /// Position of the task in the configured list
        task: usize,
    },

    /// Task cannot complete within its own period
    #[error("Task {task}: execution time {execution_time} exceeds period {period}")]
    ExecutionExceedsPeriod {
        /// Position of the task in the configured list
        task: usize,
        /// Offending execution time
        execution_time: u64,
        /// Task period
        period: u64,
    },

    /// Configuration document is malformed
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Static description of one periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Higher value is more urgent
    pub priority: i32,
    /// Ticks between reactivations
    pub period: u64,
    /// Ticks of work per activation
    pub execution_time: u64,
    /// Whether the task must hold the shared resource while running
    #[serde(default)]
    pub needs_resource: bool,
}

impl TaskSpec {
    /// Creates a task specification.
    pub fn new(priority: i32, period: u64, execution_time: u64, needs_resource: bool) -> Self {
        Self {
            priority,
            period,
            execution_time,
            needs_resource,
        }
    }

    /// Fraction of processor time this task demands.
    pub fn utilization(&self) -> f64 {
        if self.period == 0 {
            return 0.0;
        }
        self.execution_time as f64 / self.period as f64
    }
}

/// Full simulation input: ordered task list plus tick horizon.
///
/// Task identities are assigned by list position starting at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Ordered task list
    pub tasks: Vec<TaskSpec>,
    /// Number of ticks to simulate
    #[serde(default = "default_horizon")]
    pub horizon: u64,
    /// Number of leading ticks kept in snapshot timelines
    #[serde(default = "default_display_window")]
    pub display_window: u64,
}

fn default_horizon() -> u64 {
    DEFAULT_HORIZON
}

fn default_display_window() -> u64 {
    DEFAULT_DISPLAY_WINDOW
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl SimulationConfig {
    /// Five-task reference workload sharing one printer-like resource.
    pub fn reference() -> Self {
        Self {
            tasks: vec![
                TaskSpec::new(4, 4, 1, true),
                TaskSpec::new(3, 6, 2, false),
                TaskSpec::new(2, 8, 3, true),
                TaskSpec::new(1, 10, 2, false),
                TaskSpec::new(1, 12, 4, true),
            ],
            horizon: DEFAULT_HORIZON,
            display_window: DEFAULT_DISPLAY_WINDOW,
        }
    }

    /// Creates a configuration with a single task.
    pub fn single_task(spec: TaskSpec, horizon: u64) -> Self {
        Self {
            tasks: vec![spec],
            horizon,
            display_window: DEFAULT_DISPLAY_WINDOW,
        }
    }

    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Parse` - Document is not a valid configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Io` - File cannot be read
    /// - `ConfigError::Parse` - File is not a valid configuration
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Parse` - Serialization failed
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Applies environment variable overrides.
    ///
    /// Recognizes `RTSIM_HORIZON` and `RTSIM_DISPLAY_WINDOW`. Values that do
    /// not parse are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(horizon) = std::env::var("RTSIM_HORIZON")
            && let Ok(ticks) = horizon.parse::<u64>()
        {
            self.horizon = ticks;
        }

        if let Ok(window) = std::env::var("RTSIM_DISPLAY_WINDOW")
            && let Ok(ticks) = window.parse::<u64>()
        {
            self.display_window = ticks;
        }

        self
    }

    /// Sum of per-task utilizations.
    pub fn total_utilization(&self) -> f64 {
        self.tasks.iter().map(TaskSpec::utilization).sum()
    }

    /// Checks every constraint the scheduler relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, checking global settings
    /// before individual tasks in list order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tasks.is_empty() {
            return Err(ConfigError::EmptyTaskSet);
        }
        if self.horizon == 0 {
            return Err(ConfigError::NonPositiveHorizon);
        }
        if self.display_window == 0 {
            return Err(ConfigError::ZeroDisplayWindow);
        }

        for (task, spec) in self.tasks.iter().enumerate() {
            if spec.period == 0 {
                return Err(ConfigError::NonPositivePeriod {
                    task,
                    period: spec.period,
                });
            }
            if self.horizon.checked_add(spec.period).is_none() {
                return Err(ConfigError::PeriodTooLarge {
                    task,
                    period: spec.period,
                    horizon: self.horizon,
                });
            }
            if spec.execution_time == 0 {
                return Err(ConfigError::NonPositiveExecutionTime { task });
            }
            if spec.execution_time > spec.period {
                return Err(ConfigError::ExecutionExceedsPeriod {
                    task,
                    execution_time: spec.execution_time,
                    period: spec.period,
                });
            }
        }

        Ok(())
    }
}
