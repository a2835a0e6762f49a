//! Candidate selection: pick the single highest-priority eligible task.

use tracing::debug;

use super::state::SimulationState;
use super::task::{TaskId, TaskState};

/// Result of a selection scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Task to execute this tick
    pub winner: Option<TaskId>,
    /// Candidates moved to Suspended because the lock was held by another task
    pub suspended: Vec<TaskId>,
}

/// Scans tasks in identity order and returns the winner, if any.
///
/// A candidate is a Ready task whose `next_run` has arrived. Candidates
/// needing the resource while another task holds it are suspended and
/// dropped. Only a strictly greater priority displaces the current best,
/// so ties go to the lowest identity. Running tasks are never candidates.
pub fn select_candidate(state: &mut SimulationState) -> Selection {
    let now = state.current_time;
    let mut selection = Selection::default();
    let mut best_priority: Option<i32> = None;

    for task in state.tasks.iter_mut() {
        if !task.is_eligible(now) {
            continue;
        }

        if task.needs_resource() && state.lock.is_held_by_other(task.id()) {
            task.state = TaskState::Suspended;
            debug!(tick = now, task = %task.id(), owner = ?state.lock.owner(), "suspended on resource");
            selection.suspended.push(task.id());
            continue;
        }

        if best_priority.is_none_or(|best| task.priority() > best) {
            best_priority = Some(task.priority());
            selection.winner = Some(task.id());
        }
    }

    selection
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
    fn test_highest_priority_wins() {
        let mut state = SimulationState::new(&SimulationConfig::reference());

        let selection = select_candidate(&mut state);

        assert_eq!(selection.winner, Some(TaskId::new(0)));
        assert!(selection.suspended.is_empty());
    }

    #[test]
    fn test_ties_go_to_lowest_identity() {
        let mut state = state_with(vec![
            TaskSpec::new(1, 10, 2, false),
            TaskSpec::new(5, 10, 2, false),
            TaskSpec::new(5, 10, 2, false),
        ]);

        assert_eq!(select_candidate(&mut state).winner, Some(TaskId::new(1)));
    }

    #[test]
    fn test_negative_priorities_are_selectable() {
        let mut state = state_with(vec![
            TaskSpec::new(-3, 10, 2, false),
            TaskSpec::new(-1, 10, 2, false),
        ]);

        assert_eq!(select_candidate(&mut state).winner, Some(TaskId::new(1)));
    }

    #[test]
    fn test_ineligible_tasks_skipped() {
        let mut state = state_with(vec![
            TaskSpec::new(9, 10, 2, false),
            TaskSpec::new(8, 10, 2, false),
            TaskSpec::new(1, 10, 2, false),
        ]);
        if let Some(task) = state.tasks.get_mut(TaskId::new(0)) {
            task.state = TaskState::Running;
            task.remaining_time = 1;
        }
        if let Some(task) = state.tasks.get_mut(TaskId::new(1)) {
            task.next_run = 5;
        }

        state.current_time = 2;
        assert_eq!(select_candidate(&mut state).winner, Some(TaskId::new(2)));
    }

    #[test]
    fn test_blocked_resource_users_are_suspended() {
        let mut state = state_with(vec![
            TaskSpec::new(9, 10, 2, true),
            TaskSpec::new(1, 10, 2, false),
            TaskSpec::new(5, 10, 2, true),
        ]);
        assert!(state.lock.acquire(TaskId::new(7)));

        let selection = select_candidate(&mut state);

        assert_eq!(selection.winner, Some(TaskId::new(1)));
        assert_eq!(selection.suspended, vec![TaskId::new(0), TaskId::new(2)]);
        assert_eq!(
            state.task(TaskId::new(0)).unwrap().state,
            TaskState::Suspended
        );
    }

    #[test]
    fn test_no_candidates() {
        let mut state = state_with(vec![TaskSpec::new(1, 10, 2, true)]);
        assert!(state.lock.acquire(TaskId::new(3)));

        let selection = select_candidate(&mut state);

        assert_eq!(selection.winner, None);
        assert_eq!(selection.suspended, vec![TaskId::new(0)]);
    }
}
