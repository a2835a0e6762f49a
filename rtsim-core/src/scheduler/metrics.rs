//! Run metrics and the terminal report.

use serde::{Deserialize, Serialize};

use super::state::SimulationState;
use super::task::{TaskId, Tick};

/// Per-task counters gathered while ticking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TaskCounters {
    dispatches: u64,
    completions: u64,
    suspensions: u64,
}

/// Counters collected during a run. Observation only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SimulationMetrics {
    ticks_executed: u64,
    idle_ticks: u64,
    per_task: Vec<TaskCounters>,
}

impl SimulationMetrics {
    /// Creates zeroed counters for `task_count` tasks.
    pub(crate) fn new(task_count: usize) -> Self {
        Self {
            ticks_executed: 0,
            idle_ticks: 0,
            per_task: vec![TaskCounters::default(); task_count],
        }
    }

    fn counters(&mut self, task: TaskId) -> Option<&mut TaskCounters> {
        self.per_task.get_mut(task.as_index())
    }

    pub(crate) fn record_tick(&mut self, dispatched: bool) {
        self.ticks_executed += 1;
        if !dispatched {
            self.idle_ticks += 1;
        }
    }

    pub(crate) fn record_dispatch(&mut self, task: TaskId) {
        if let Some(counters) = self.counters(task) {
            counters.dispatches += 1;
        }
    }

    pub(crate) fn record_completion(&mut self, task: TaskId) {
        if let Some(counters) = self.counters(task) {
            counters.completions += 1;
        }
    }

    pub(crate) fn record_suspension(&mut self, task: TaskId) {
        if let Some(counters) = self.counters(task) {
            counters.suspensions += 1;
        }
    }
}

/// Final per-task outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Task identity
    pub id: TaskId,
    /// Static priority
    pub priority: i32,
    /// Deadline misses at the end of the run
    pub missed_deadlines: u64,
    /// Times the task was selected for execution
    pub dispatches: u64,
    /// Activations finished
    pub completions: u64,
    /// Times the task was suspended on the resource
    pub suspensions: u64,
}

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Configured tick horizon
    pub horizon: Tick,
    /// Ticks actually processed
    pub ticks_executed: Tick,
    /// Ticks with no dispatch
    pub idle_ticks: Tick,
    /// Per-task outcomes in identity order
    pub tasks: Vec<TaskReport>,
}

impl SimulationReport {
    pub(crate) fn build(horizon: Tick, state: &SimulationState, metrics: &SimulationMetrics) -> Self {
        let tasks = state
            .tasks
            .iter()
            .map(|task| {
                let counters = metrics
                    .per_task
                    .get(task.id().as_index())
                    .copied()
                    .unwrap_or_default();
                TaskReport {
                    id: task.id(),
                    priority: task.priority(),
                    missed_deadlines: task.missed_deadlines,
                    dispatches: counters.dispatches,
                    completions: counters.completions,
                    suspensions: counters.suspensions,
                }
            })
            .collect();

        Self {
            horizon,
            ticks_executed: metrics.ticks_executed,
            idle_ticks: metrics.idle_ticks,
            tasks,
        }
    }

    /// Sum of deadline misses across all tasks.
    pub fn total_missed_deadlines(&self) -> u64 {
        self.tasks.iter().map(|task| task.missed_deadlines).sum()
    }

    /// Human-readable deadline miss summary.
    pub fn summary(&self) -> String {
        let mut summary = String::from("Simulation Complete. Deadline Miss Summary:\n");
        for task in &self.tasks {
            summary.push_str(&format!(
                "Task {}: {} missed deadlines\n",
                task.id, task.missed_deadlines
            ));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    #[test]
    fn test_report_combines_state_and_counters() {
        let mut state = SimulationState::new(&SimulationConfig::reference());
        if let Some(task) = state.tasks.get_mut(TaskId::new(1)) {
            task.missed_deadlines = 3;
        }
        let mut metrics = SimulationMetrics::new(5);
        metrics.record_tick(true);
        metrics.record_tick(false);
        metrics.record_dispatch(TaskId::new(1));
        metrics.record_completion(TaskId::new(1));
        metrics.record_suspension(TaskId::new(4));
        // Unknown identities are ignored
        metrics.record_dispatch(TaskId::new(99));

        let report = SimulationReport::build(20, &state, &metrics);

        assert_eq!(report.ticks_executed, 2);
        assert_eq!(report.idle_ticks, 1);
        assert_eq!(report.tasks[1].dispatches, 1);
        assert_eq!(report.tasks[1].completions, 1);
        assert_eq!(report.tasks[4].suspensions, 1);
        assert_eq!(report.total_missed_deadlines(), 3);
    }

    #[test]
    fn test_summary_format() {
        let state = SimulationState::new(&SimulationConfig::reference());
        let report = SimulationReport::build(20, &state, &SimulationMetrics::new(5));

        let summary = report.summary();
        assert!(summary.starts_with("Simulation Complete. Deadline Miss Summary:\n"));
        assert!(summary.contains("Task 4: 0 missed deadlines\n"));
        assert_eq!(summary.lines().count(), 6);
    }
}
