//! Task model and the per-task state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lock::ResourceLock;
use crate::config::TaskSpec;

/// Discrete simulation time.
pub type Tick = u64;

/// Stable task identity, assigned from configuration order.
///
/// Ordering is significant: ties in priority go to the lower identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(usize);

impl TaskId {
    /// Creates a task identity from a list position.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the list position this identity was assigned from.
    pub fn as_index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Eligible for selection once `next_run` is reached
    Ready,
    /// Dispatched; runs until its activation is exhausted
    Running,
    /// Activation finished, sleeping until `next_run`
    Waiting,
    /// Blocked on the shared resource
    Suspended,
}

impl TaskState {
    /// Human-readable state name.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Ready => "Ready",
            TaskState::Running => "Running",
            TaskState::Waiting => "Waiting",
            TaskState::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One periodic job.
///
/// Static parameters come from [`TaskSpec`]; the remaining fields evolve
/// only through the monitor, selector and execution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    priority: i32,
    period: Tick,
    execution_time: Tick,
    needs_resource: bool,
    /// Current scheduling state
    pub state: TaskState,
    /// Ticks left in the current activation
    pub remaining_time: Tick,
    /// Earliest tick a waiting task becomes eligible again
    pub next_run: Tick,
    /// Absolute tick by which the current activation must finish
    pub deadline: Tick,
    /// Deadline misses so far
    pub missed_deadlines: u64,
}

impl Task {
    /// Creates a task in its initial state.
    pub fn from_spec(id: TaskId, spec: &TaskSpec) -> Self {
        Self {
            id,
            priority: spec.priority,
            period: spec.period,
            execution_time: spec.execution_time,
            needs_resource: spec.needs_resource,
            state: TaskState::Ready,
            remaining_time: 0,
            next_run: 0,
            deadline: spec.period,
            missed_deadlines: 0,
        }
    }

    /// Task identity.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Static priority, higher is more urgent.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Ticks between reactivations.
    pub fn period(&self) -> Tick {
        self.period
    }

    /// Ticks of work per activation.
    pub fn execution_time(&self) -> Tick {
        self.execution_time
    }

    /// Whether the task must hold the resource lock while running.
    pub fn needs_resource(&self) -> bool {
        self.needs_resource
    }

    /// True if the task is Ready and its release time has arrived.
    pub fn is_eligible(&self, now: Tick) -> bool {
        self.state == TaskState::Ready && self.next_run <= now
    }

    /// Consumes one tick of work. Returns `None` if no work was left.
    pub(crate) fn consume_tick(&mut self) -> Option<Tick> {
        self.remaining_time = self.remaining_time.checked_sub(1)?;
        Some(self.remaining_time)
    }

    /// Ends the current activation at `now`.
    ///
    /// Releases the lock for resource users, moves to Waiting and sets the
    /// next release and deadline one period out.
    pub(crate) fn complete_activation(&mut self, now: Tick, lock: &mut ResourceLock) {
        if self.needs_resource {
            lock.release();
        }
        self.state = TaskState::Waiting;
        self.next_run = now + self.period;
        self.deadline = self.next_run;
    }
}

/// Fixed set of tasks owned for the whole simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    /// Registers tasks in list order, assigning identities from 0.
    pub fn from_specs(specs: &[TaskSpec]) -> Self {
        let tasks = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Task::from_spec(TaskId::new(index), spec))
            .collect();
        Self { tasks }
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Looks up a task by identity.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.as_index())
    }

    /// Looks up a task by identity for mutation.
    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id.as_index())
    }

    /// Iterates tasks in identity order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Iterates tasks mutably in identity order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Task> {
        self.tasks.iter_mut()
    }

    /// Tasks currently in the Running state.
    pub fn running(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(|task| task.state == TaskState::Running)
    }
}

impl<'a> IntoIterator for &'a TaskRegistry {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
