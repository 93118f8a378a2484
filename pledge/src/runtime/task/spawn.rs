use super::Task;
use crate::error::TaskError;

use std::future::Future;

/// Drives `future` on the current runtime and returns the task it settles.
///
/// The future starts on the next scheduler turn. The returned task is
/// cancellable: cancelling it drops the future without polling it again.
///
/// # Panics
///
/// Panics if called outside of a running runtime.
///
/// # Examples
///
/// ```rust,ignore
/// let task = spawn(async {
///     sleep(Duration::from_millis(10)).await;
///     Ok::<_, TaskError>(42)
/// });
/// assert_eq!(task.await.unwrap(), 42);
/// ```
pub fn spawn<F, T>(future: F) -> Task<T>
where
    F: Future<Output = Result<T, TaskError>> + 'static,
    T: Clone + 'static,
{
    let (task, resolver) = Task::pair();
    let scheduler = task.scheduler().clone();

    let settle = resolver.clone();
    let id = scheduler.spawn_local(async move {
        let result = future.await;
        settle.settle(result);
    });

    resolver.on_cancel(move || scheduler.abort(id));

    task
}
