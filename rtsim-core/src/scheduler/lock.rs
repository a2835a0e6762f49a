//! Binary resource lock shared by all resource-using tasks.

use tracing::trace;

use super::task::TaskId;

/// Single binary semaphore with an owning task identity.
///
/// `owner` is `Some` exactly when the lock is held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLock {
    owner: Option<TaskId>,
}

impl ResourceLock {
    /// Creates a free lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lock for `task` if it is free.
    ///
    /// Returns false and leaves the lock untouched when already held.
    pub fn acquire(&mut self, task: TaskId) -> bool {
        if self.owner.is_some() {
            return false;
        }
        trace!(task = %task, "resource lock acquired");
        self.owner = Some(task);
        true
    }

    /// Frees the lock unconditionally. No ownership check is made.
    pub fn release(&mut self) {
        if let Some(task) = self.owner.take() {
            trace!(task = %task, "resource lock released");
        }
    }

    /// True if some task holds the lock.
    pub fn is_held(&self) -> bool {
        self.owner.is_some()
    }

    /// Current holder, if any.
    pub fn owner(&self) -> Option<TaskId> {
        self.owner
    }

    /// True if the lock is held by a task other than `task`.
    pub fn is_held_by_other(&self, task: TaskId) -> bool {
        matches!(self.owner, Some(owner) if owner != task)
    }
}
