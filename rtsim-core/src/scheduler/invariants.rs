//! Invariant checking for settled per-tick state.
//!
//! Violations indicate a scheduling-logic defect. They are reported as
//! fatal errors and never repaired.

use std::fmt;

use serde::Serialize;

use super::state::SimulationState;
use super::task::{TaskState, Tick};

/// Violation of a scheduler invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: String,
    /// Tick at which the violation was detected
    pub tick: Tick,
    /// Detailed description of the violation
    pub description: String,
}

impl InvariantViolation {
    /// Creates a violation record.
    pub fn new(invariant: &str, tick: Tick, description: String) -> Self {
        Self {
            invariant: invariant.to_string(),
            tick,
            description,
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invariant '{}' violated at tick {}: {}",
            self.invariant, self.tick, self.description
        )
    }
}

impl std::error::Error for InvariantViolation {}

/// Trait for checking scheduler invariants across one tick.
pub trait Invariant: Send + Sync {
    /// Checks the settled state of a tick against the settled state of the
    /// tick before it.
    ///
    /// # Errors
    /// Returns `InvariantViolation` if the invariant condition is not met.
    fn check(
        &self,
        previous: &SimulationState,
        current: &SimulationState,
    ) -> Result<(), InvariantViolation>;

    /// Returns name of this invariant.
    fn name(&self) -> &str;
}

/// Invariants installed on every simulation.
pub fn builtin_invariants() -> Vec<Box<dyn Invariant>> {
    vec![
        Box::new(RemainingTimeBounds),
        Box::new(LockOwnership),
        Box::new(SuspensionRequiresResource),
        Box::new(DeadlineMonotonic),
        Box::new(MissCounterMonotonic),
    ]
}

/// `remaining_time` never exceeds `execution_time`, and a Running task
/// always has work left.
pub struct RemainingTimeBounds;

impl Invariant for RemainingTimeBounds {
    fn check(
        &self,
        _previous: &SimulationState,
        current: &SimulationState,
    ) -> Result<(), InvariantViolation> {
        for task in &current.tasks {
            if task.remaining_time > task.execution_time() {
                return Err(InvariantViolation::new(
                    self.name(),
                    current.current_time,
                    format!(
                        "task {} has remaining time {} above execution time {}",
                        task.id(),
                        task.remaining_time,
                        task.execution_time()
                    ),
                ));
            }
            if task.state == TaskState::Running && task.remaining_time == 0 {
                return Err(InvariantViolation::new(
                    self.name(),
                    current.current_time,
                    format!("task {} is Running with no remaining time", task.id()),
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "RemainingTimeBounds"
    }
}

/// The lock is held exactly when one Running resource user exists, and
/// that task is the owner.
pub struct LockOwnership;

impl Invariant for LockOwnership {
    fn check(
        &self,
        _previous: &SimulationState,
        current: &SimulationState,
    ) -> Result<(), InvariantViolation> {
        let holders: Vec<_> = current
            .tasks
            .running()
            .filter(|task| task.needs_resource())
            .map(|task| task.id())
            .collect();

        let consistent = match (current.lock.owner(), holders.as_slice()) {
            (None, []) => true,
            (Some(owner), [holder]) => owner == *holder,
            _ => false,
        };

        if !consistent {
            return Err(InvariantViolation::new(
                self.name(),
                current.current_time,
                format!(
                    "lock owner {:?} does not match running resource users {:?}",
                    current.lock.owner(),
                    holders
                ),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "LockOwnership"
    }
}

/// Only tasks that need the resource can be Suspended.
pub struct SuspensionRequiresResource;

impl Invariant for SuspensionRequiresResource {
    fn check(
        &self,
        _previous: &SimulationState,
        current: &SimulationState,
    ) -> Result<(), InvariantViolation> {
        let stray = current
            .tasks
            .iter()
            .find(|task| task.state == TaskState::Suspended && !task.needs_resource());

        match stray {
            Some(task) => Err(InvariantViolation::new(
                self.name(),
                current.current_time,
                format!("task {} is Suspended but needs no resource", task.id()),
            )),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "SuspensionRequiresResource"
    }
}

/// Deadlines never move backwards.
pub struct DeadlineMonotonic;

impl Invariant for DeadlineMonotonic {
    fn check(
        &self,
        previous: &SimulationState,
        current: &SimulationState,
    ) -> Result<(), InvariantViolation> {
        for (before, after) in previous.tasks.iter().zip(current.tasks.iter()) {
            if after.deadline < before.deadline {
                return Err(InvariantViolation::new(
                    self.name(),
                    current.current_time,
                    format!(
                        "task {} deadline moved back from {} to {}",
                        after.id(),
                        before.deadline,
                        after.deadline
                    ),
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "DeadlineMonotonic"
    }
}

/// Miss counters grow by zero or one per tick.
pub struct MissCounterMonotonic;

impl Invariant for MissCounterMonotonic {
    fn check(
        &self,
        previous: &SimulationState,
        current: &SimulationState,
    ) -> Result<(), InvariantViolation> {
        for (before, after) in previous.tasks.iter().zip(current.tasks.iter()) {
            let grew_by = after.missed_deadlines.checked_sub(before.missed_deadlines);
            if !matches!(grew_by, Some(0 | 1)) {
                return Err(InvariantViolation::new(
                    self.name(),
                    current.current_time,
                    format!(
                        "task {} miss counter went from {} to {}",
                        after.id(),
                        before.missed_deadlines,
                        after.missed_deadlines
                    ),
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MissCounterMonotonic"
    }
}
