//! Chaining operators.
//!
//! Every operator is a thin layer over [`Task::on_settle`] (or the same
//! registration primitive) and returns a new task; the receiver is never
//! modified.

use super::Task;
use crate::error::TaskError;

impl<T: Clone + 'static> Task<T> {
    /// Transforms the fulfilled value; rejections pass through unchanged.
    pub fn map<U, F>(&self, f: F) -> Task<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.on_settle(move |value| Ok(f(value)), Err)
    }

    /// Transforms the rejection; values pass through unchanged.
    pub fn map_err<F>(&self, f: F) -> Task<T>
    where
        F: FnOnce(TaskError) -> TaskError + 'static,
    {
        self.on_settle(Ok, move |error| Err(f(error)))
    }

    /// Continues with another task built from the fulfilled value.
    ///
    /// The returned task settles like the task produced by `f`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let comments = fetch_user(123)
    ///     .and_then(|user| fetch_posts(user))
    ///     .and_then(|posts| fetch_comments(posts));
    /// ```
    pub fn and_then<U, F>(&self, f: F) -> Task<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Task<U> + 'static,
    {
        let (next, resolver) = Task::pair();

        self.watch(move |result| match result {
            Ok(value) => f(value).watch(move |result| {
                resolver.settle(result);
            }),
            Err(error) => {
                resolver.reject(error);
            }
        });

        next
    }

    /// Turns a rejection back into a value.
    pub fn recover<F>(&self, f: F) -> Task<T>
    where
        F: FnOnce(TaskError) -> T + 'static,
    {
        self.on_settle(Ok, move |error| Ok(f(error)))
    }

    /// Continues with another task when this one rejects.
    ///
    /// Useful to get back on track after a failure, e.g. falling back to a
    /// second operation.
    pub fn or_else<F>(&self, f: F) -> Task<T>
    where
        F: FnOnce(TaskError) -> Task<T> + 'static,
    {
        let (next, resolver) = Task::pair();

        self.watch(move |result| match result {
            Ok(value) => {
                resolver.resolve(value);
            }
            Err(error) => f(error).watch(move |result| {
                resolver.settle(result);
            }),
        });

        next
    }

    /// Runs `f` once the task settles, whatever the outcome.
    ///
    /// The returned task settles exactly like the receiver, after `f` ran.
    pub fn ensure<F>(&self, f: F) -> Task<T>
    where
        F: FnOnce() + 'static,
    {
        let (next, resolver) = Task::pair();

        self.watch(move |result| {
            f();
            resolver.settle(result);
        });

        next
    }
}
