use crate::error::TaskError;

/// Settlement state of a [`Task`](super::Task).
///
/// A task starts `Pending` and moves to `Fulfilled` or `Rejected` exactly
/// once. There is no way back to `Pending`.
#[derive(Debug, Clone)]
pub enum TaskState<T> {
    /// The computation has not settled yet.
    Pending,

    /// The computation succeeded with a value.
    Fulfilled(T),

    /// The computation failed.
    Rejected(TaskError),
}

impl<T> TaskState<T> {
    /// Returns `true` while the task has not settled.
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Pending)
    }

    /// Returns `true` if the task settled with a value.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, TaskState::Fulfilled(_))
    }

    /// Returns `true` if the task settled with an error.
    pub fn is_rejected(&self) -> bool {
        matches!(self, TaskState::Rejected(_))
    }
}

impl<T: Clone> TaskState<T> {
    /// Returns a copy of the settled result, or `None` while pending.
    pub(crate) fn result(&self) -> Option<Result<T, TaskError>> {
        match self {
            TaskState::Pending => None,
            TaskState::Fulfilled(value) => Some(Ok(value.clone())),
            TaskState::Rejected(error) => Some(Err(error.clone())),
        }
    }
}
