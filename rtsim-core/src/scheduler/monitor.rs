//! Deadline monitor: the start-of-tick pass over every task.
//!
//! Each task is processed completely before the next one, in identity
//! order: running countdown, deadline check, Waiting to Ready, then
//! Suspended to Ready. A lock released by a later task in the same pass is
//! therefore not yet visible to an earlier suspended task.

use tracing::debug;

use super::invariants::InvariantViolation;
use super::state::SimulationState;
use super::task::{TaskId, TaskState};

/// What the monitor pass changed, for metrics and logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorOutcome {
    /// Running tasks that consumed a tick of work this pass
    pub worked: Vec<TaskId>,
    /// Running tasks whose activation finished this pass
    pub completed: Vec<TaskId>,
    /// Tasks charged with a deadline miss this pass
    pub missed: Vec<TaskId>,
    /// Waiting tasks released for a new activation
    pub released: Vec<TaskId>,
    /// Suspended tasks made Ready again
    pub resumed: Vec<TaskId>,
}

/// Runs the monitor pass for `state.current_time`.
///
/// # Errors
///
/// - `InvariantViolation` - A Running task had no work left to consume
pub fn advance(state: &mut SimulationState) -> Result<MonitorOutcome, InvariantViolation> {
    let now = state.current_time;
    let mut outcome = MonitorOutcome::default();

    for task in state.tasks.iter_mut() {
        if task.state == TaskState::Running {
            let remaining = task.consume_tick().ok_or_else(|| {
                InvariantViolation::new(
                    "RemainingTimeBounds",
                    now,
                    format!("task {} is Running with no remaining time", task.id()),
                )
            })?;
            outcome.worked.push(task.id());

            if remaining == 0 {
                task.complete_activation(now, &mut state.lock);
                debug!(tick = now, task = %task.id(), next_run = task.next_run, "activation complete");
                outcome.completed.push(task.id());
            }
        }

        // Fires at most once per tick; an overdue task accrues one miss per tick.
        match task.state {
            TaskState::Ready | TaskState::Waiting if task.deadline <= now => {
                task.missed_deadlines += 1;
                task.deadline += task.period();
                debug!(
                    tick = now,
                    task = %task.id(),
                    missed = task.missed_deadlines,
                    deadline = task.deadline,
                    "deadline missed"
                );
                outcome.missed.push(task.id());
            }
            TaskState::Ready | TaskState::Waiting | TaskState::Running | TaskState::Suspended => {}
        }

        if task.state == TaskState::Waiting && task.next_run <= now {
            task.state = TaskState::Ready;
            outcome.released.push(task.id());
        }

        if task.state == TaskState::Suspended && (!task.needs_resource() || !state.lock.is_held()) {
            task.state = TaskState::Ready;
            debug!(tick = now, task = %task.id(), "resumed from suspension");
            outcome.resumed.push(task.id());
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimulationConfig, TaskSpec};

    fn state_with(specs: Vec<TaskSpec>) -> SimulationState {
        SimulationState::new(&SimulationConfig {
            tasks: specs,
            horizon: 20,
            display_window: 20,
        })
    }

    #[test]
    fn test_running_task_counts_down_then_completes() {
        let mut state = state_with(vec![TaskSpec::new(1, 6, 2, false)]);
        let id = TaskId::new(0);
        if let Some(task) = state.tasks.get_mut(id) {
            task.state = TaskState::Running;
            task.remaining_time = 2;
        }

        state.current_time = 3;
        let outcome = advance(&mut state).unwrap();
        let task = state.task(id).unwrap();
        assert_eq!(outcome.worked, vec![id]);
        assert!(outcome.completed.is_empty());
        assert_eq!(task.state, TaskState::Running);
        assert_eq!(task.remaining_time, 1);

        state.current_time = 4;
        let outcome = advance(&mut state).unwrap();
        let task = state.task(id).unwrap();
        assert_eq!(outcome.completed, vec![id]);
        assert_eq!(task.state, TaskState::Waiting);
        assert_eq!(task.next_run, 10);
        assert_eq!(task.deadline, 10);
    }

    #[test]
    fn test_completion_releases_lock() {
        let mut state = state_with(vec![TaskSpec::new(1, 6, 2, true)]);
        let id = TaskId::new(0);
        assert!(state.lock.acquire(id));
        if let Some(task) = state.tasks.get_mut(id) {
            task.state = TaskState::Running;
            task.remaining_time = 1;
        }

        advance(&mut state).unwrap();

        assert!(!state.lock.is_held());
    }

    #[test]
    fn test_running_without_work_is_violation() {
        let mut state = state_with(vec![TaskSpec::new(1, 6, 2, false)]);
        if let Some(task) = state.tasks.get_mut(TaskId::new(0)) {
            task.state = TaskState::Running;
            task.remaining_time = 0;
        }

        let violation = advance(&mut state).unwrap_err();
        assert_eq!(violation.invariant, "RemainingTimeBounds");
    }

    #[test]
    fn test_overdue_task_misses_once_per_tick() {
        let mut state = state_with(vec![TaskSpec::new(1, 2, 1, false)]);
        let id = TaskId::new(0);

        // Ready and never dispatched: deadline 2
        state.current_time = 1;
        advance(&mut state).unwrap();
        assert_eq!(state.task(id).unwrap().missed_deadlines, 0);

        state.current_time = 2;
        let outcome = advance(&mut state).unwrap();
        assert_eq!(outcome.missed, vec![id]);
        assert_eq!(state.task(id).unwrap().deadline, 4);

        // Far overdue: no catch-up in a single tick
        state.current_time = 9;
        advance(&mut state).unwrap();
        let task = state.task(id).unwrap();
        assert_eq!(task.missed_deadlines, 2);
        assert_eq!(task.deadline, 6);
    }

    #[test]
    fn test_running_and_suspended_tasks_are_not_charged() {
        let mut state = state_with(vec![
            TaskSpec::new(1, 2, 2, false),
            TaskSpec::new(1, 2, 1, true),
        ]);
        assert!(state.lock.acquire(TaskId::new(7)));
        if let Some(task) = state.tasks.get_mut(TaskId::new(0)) {
            task.state = TaskState::Running;
            task.remaining_time = 2;
        }
        if let Some(task) = state.tasks.get_mut(TaskId::new(1)) {
            task.state = TaskState::Suspended;
        }

        state.current_time = 5;
        let outcome = advance(&mut state).unwrap();

        assert!(outcome.missed.is_empty());
        assert_eq!(
            state.task(TaskId::new(1)).unwrap().state,
            TaskState::Suspended
        );
    }

    #[test]
    fn test_reactivation_tick_counts_as_miss() {
        let mut state = state_with(vec![TaskSpec::new(4, 4, 1, false)]);
        let id = TaskId::new(0);
        if let Some(task) = state.tasks.get_mut(id) {
            task.state = TaskState::Waiting;
            task.next_run = 4;
            task.deadline = 4;
        }

        state.current_time = 4;
        let outcome = advance(&mut state).unwrap();

        let task = state.task(id).unwrap();
        assert_eq!(outcome.missed, vec![id]);
        assert_eq!(outcome.released, vec![id]);
        assert_eq!(task.state, TaskState::Ready);
        assert_eq!(task.deadline, 8);
    }

    #[test]
    fn test_suspended_resumes_when_lock_free() {
        let mut state = state_with(vec![TaskSpec::new(2, 8, 3, true)]);
        let id = TaskId::new(0);
        if let Some(task) = state.tasks.get_mut(id) {
            task.state = TaskState::Suspended;
        }

        let outcome = advance(&mut state).unwrap();

        assert_eq!(outcome.resumed, vec![id]);
        assert_eq!(state.task(id).unwrap().state, TaskState::Ready);
    }

    #[test]
    fn test_lock_release_later_in_pass_not_seen_by_earlier_task() {
        let mut state = state_with(vec![
            TaskSpec::new(4, 4, 1, true),
            TaskSpec::new(2, 8, 3, true),
        ]);
        assert!(state.lock.acquire(TaskId::new(1)));
        if let Some(task) = state.tasks.get_mut(TaskId::new(0)) {
            task.state = TaskState::Suspended;
        }
        if let Some(task) = state.tasks.get_mut(TaskId::new(1)) {
            task.state = TaskState::Running;
            task.remaining_time = 1;
        }

        state.current_time = 3;
        let outcome = advance(&mut state).unwrap();

        assert_eq!(outcome.completed, vec![TaskId::new(1)]);
        assert!(!state.lock.is_held());
        assert_eq!(
            state.task(TaskId::new(0)).unwrap().state,
            TaskState::Suspended
        );

        state.current_time = 4;
        let outcome = advance(&mut state).unwrap();
        assert_eq!(outcome.resumed, vec![TaskId::new(0)]);
    }
}
