//! Immutable per-tick observations for external renderers.
//!
//! A snapshot exposes only what a renderer needs: task identity, priority,
//! state, miss count, resource flag, the lock status and a bounded
//! timeline. No other scheduler internals leak through.

use serde::{Deserialize, Serialize};

use super::state::SimulationState;
use super::task::{TaskId, TaskState, Tick};

/// Per-task facts for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    /// Task identity
    pub id: TaskId,
    /// Static priority
    pub priority: i32,
    /// State after the tick settled
    pub state: TaskState,
    /// Deadline misses so far
    pub missed_deadlines: u64,
    /// Whether the task uses the shared resource
    pub needs_resource: bool,
}

/// Resource lock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockView {
    /// Whether the lock is taken
    pub held: bool,
    /// Current holder
    pub owner: Option<TaskId>,
}

/// What a task was doing at one recorded tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineMark {
    /// Executing
    Running,
    /// Not yet released for its next activation
    Inactive,
    /// Blocked on the shared resource
    Suspended,
    /// Released but not executing
    Idle,
}

impl TimelineMark {
    /// Classifies a task at `tick` from its settled state.
    ///
    /// A task that consumed work during the tick is Running even if it
    /// finished and settled into Waiting.
    pub fn classify(state: TaskState, next_run: Tick, tick: Tick, worked: bool) -> Self {
        if worked {
            return TimelineMark::Running;
        }
        match state {
            TaskState::Running => TimelineMark::Running,
            TaskState::Suspended => TimelineMark::Suspended,
            TaskState::Ready | TaskState::Waiting if tick < next_run => TimelineMark::Inactive,
            TaskState::Ready | TaskState::Waiting => TimelineMark::Idle,
        }
    }
}

/// Recorded marks for one task, indexed by tick from 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTimeline {
    /// Task identity
    pub id: TaskId,
    /// One mark per recorded tick
    pub marks: Vec<TimelineMark>,
}

/// Observation of one fully settled tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tick this snapshot describes
    pub current_time: Tick,
    /// Tasks in identity order
    pub tasks: Vec<TaskView>,
    /// Lock status
    pub lock: LockView,
    /// Per-task history over the display window
    pub timeline: Vec<TaskTimeline>,
}

impl Snapshot {
    /// Looks up a task view by identity.
    pub fn task(&self, id: TaskId) -> Option<&TaskView> {
        self.tasks.iter().find(|view| view.id == id)
    }
}

/// Consumer of per-tick snapshots.
pub trait SnapshotSink {
    /// Called once per tick with the settled snapshot.
    fn observe(&mut self, snapshot: &Snapshot);
}

impl SnapshotSink for Vec<Snapshot> {
    fn observe(&mut self, snapshot: &Snapshot) {
        self.push(snapshot.clone());
    }
}

/// Accumulates timeline marks for the first `window` ticks.
#[derive(Debug, Clone)]
pub(crate) struct TimelineRecorder {
    window: u64,
    timelines: Vec<TaskTimeline>,
}

impl TimelineRecorder {
    pub(crate) fn new(state: &SimulationState, window: u64) -> Self {
        let timelines = state
            .tasks
            .iter()
            .map(|task| TaskTimeline {
                id: task.id(),
                marks: Vec::new(),
            })
            .collect();
        Self { window, timelines }
    }

    pub(crate) fn record(&mut self, state: &SimulationState, worked: &[TaskId]) {
        if state.current_time >= self.window {
            return;
        }
        for (timeline, task) in self.timelines.iter_mut().zip(state.tasks.iter()) {
            timeline.marks.push(TimelineMark::classify(
                task.state,
                task.next_run,
                state.current_time,
                worked.contains(&task.id()),
            ));
        }
    }

    pub(crate) fn snapshot(&self, state: &SimulationState) -> Snapshot {
        Snapshot {
            current_time: state.current_time,
            tasks: state
                .tasks
                .iter()
                .map(|task| TaskView {
                    id: task.id(),
                    priority: task.priority(),
                    state: task.state,
                    missed_deadlines: task.missed_deadlines,
                    needs_resource: task.needs_resource(),
                })
                .collect(),
            lock: LockView {
                held: state.lock.is_held(),
                owner: state.lock.owner(),
            },
            timeline: self.timelines.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    #[test]
    fn test_classify_marks() {
        assert_eq!(
            TimelineMark::classify(TaskState::Running, 0, 3, true),
            TimelineMark::Running
        );
        assert_eq!(
            TimelineMark::classify(TaskState::Suspended, 9, 3, false),
            TimelineMark::Suspended
        );
        assert_eq!(
            TimelineMark::classify(TaskState::Waiting, 9, 3, false),
            TimelineMark::Inactive
        );
        assert_eq!(
            TimelineMark::classify(TaskState::Ready, 0, 3, false),
            TimelineMark::Idle
        );
        // Finished within the tick
        assert_eq!(
            TimelineMark::classify(TaskState::Waiting, 7, 3, true),
            TimelineMark::Running
        );
    }

    #[test]
    fn test_recorder_stops_at_window() {
        let mut state = SimulationState::new(&SimulationConfig::reference());
        let mut recorder = TimelineRecorder::new(&state, 2);

        for tick in 0..5 {
            state.current_time = tick;
            recorder.record(&state, &[]);
        }

        let snapshot = recorder.snapshot(&state);
        assert_eq!(snapshot.current_time, 4);
        assert_eq!(snapshot.timeline.len(), 5);
        assert!(snapshot.timeline.iter().all(|t| t.marks.len() == 2));
    }

    #[test]
    fn test_snapshot_exposes_lock() {
        let mut state = SimulationState::new(&SimulationConfig::reference());
        assert!(state.lock.acquire(TaskId::new(2)));
        let recorder = TimelineRecorder::new(&state, 20);

        let snapshot = recorder.snapshot(&state);

        assert_eq!(
            snapshot.lock,
            LockView {
                held: true,
                owner: Some(TaskId::new(2))
            }
        );
        assert_eq!(snapshot.task(TaskId::new(4)).map(|v| v.priority), Some(1));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let state = SimulationState::new(&SimulationConfig::reference());
        let snapshot = TimelineRecorder::new(&state, 20).snapshot(&state);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["current_time"], 0);
        assert_eq!(json["tasks"][0]["state"], "Ready");
        assert_eq!(json["lock"]["owner"], serde_json::Value::Null);
    }
}
