use super::core::Inner;
use crate::error::TaskError;

use std::rc::Rc;

/// The capability to settle a [`Task`](super::Task).
///
/// A resolver is handed to the executor of [`Task::new`](super::Task::new).
/// It can be cloned and moved into timers, spawned futures or continuations;
/// whichever clone settles first wins and every later call returns `false`.
pub struct Resolver<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Resolver<T> {
    pub(crate) fn new(inner: Rc<Inner<T>>) -> Self {
        Self { inner }
    }

    /// Fulfills the task. Returns `false` if it had already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.inner.settle(Ok(value))
    }

    /// Rejects the task. Returns `false` if it had already settled.
    pub fn reject(&self, error: TaskError) -> bool {
        self.inner.settle(Err(error))
    }

    /// Settles the task with `result`. Returns `false` if it had already
    /// settled.
    pub fn settle(&self, result: Result<T, TaskError>) -> bool {
        self.inner.settle(result)
    }

    /// Returns `true` once the task has settled, by any party.
    pub fn is_settled(&self) -> bool {
        !self.inner.is_pending()
    }

    /// Registers a hook that releases resources if the task is cancelled.
    ///
    /// Hooks run after the task settles as `Rejected(Cancelled)`, either from
    /// its token or from [`Task::cancel`](super::Task::cancel). They are
    /// dropped without running when the task settles any other way. A task
    /// with at least one hook is cancellable.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let task = Task::with_token(&token, |resolver| {
    ///     let (timer, handle) = after(Duration::from_secs(3));
    ///     resolver.on_cancel(move || {
    ///         handle.cancel();
    ///     });
    ///     let done = resolver.clone();
    ///     timer.map(move |()| done.resolve("finished"));
    /// });
    /// ```
    pub fn on_cancel(&self, hook: impl FnOnce() + 'static) {
        self.inner.add_release(Box::new(hook));
    }
}
