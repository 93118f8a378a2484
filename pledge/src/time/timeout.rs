use crate::combinator::race_first;
use crate::error::TaskError;
use crate::task::Task;
use crate::time::after::after;
use crate::time::sleep::{Sleep, sleep};

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Bounds the time `task` may take to settle.
///
/// The returned task settles like `task` if it settles within `timeout`;
/// otherwise it rejects with [`TaskError::Timeout`]. Whichever side loses is
/// cleaned up:
/// - if `task` wins, the timer is cancelled right away,
/// - if the timer wins and `task` is cancellable, `task` is cancelled.
///
/// A non-cancellable task keeps running after the timeout; its eventual
/// outcome is ignored.
///
/// # Examples
///
/// ```rust,ignore
/// let slow = fetch_data("slow");
/// match with_timeout(slow, Duration::from_secs(1)).await {
///     Err(TaskError::Timeout { timeout }) => println!("gave up after {timeout:?}"),
///     other => println!("{other:?}"),
/// }
/// ```
pub fn with_timeout<T>(task: Task<T>, timeout: Duration) -> Task<T>
where
    T: Clone + 'static,
{
    let (timer, handle) = after(timeout);
    let expiry = timer.on_settle(move |()| Err(TaskError::Timeout { timeout }), Err);

    let raced = race_first([task.clone(), expiry]);

    raced.tap(move |_| {
        if handle.cancel() {
            return;
        }
        if task.is_pending() && task.cancel() {
            tracing::debug!(?timeout, "timed out task cancelled");
        }
    });

    raced
}

/// Requires a future to complete before the given duration.
///
/// The returned future resolves to:
/// - `Ok(output)` if the wrapped future completes first,
/// - `Err(TaskError::Timeout { .. })` if the duration elapses first.
///
/// The wrapped future is dropped along with the `Timeout` future.
///
/// # Examples
///
/// ```rust,ignore
/// let result = timeout(Duration::from_millis(10), async {
///     sleep(Duration::from_millis(50)).await;
/// })
/// .await;
/// assert!(matches!(result, Err(TaskError::Timeout { .. })));
/// ```
pub fn timeout<F>(duration: Duration, future: F) -> Timeout<F>
where
    F: Future,
{
    Timeout::new(duration, future)
}

/// Future returned by [`timeout`].
pub struct Timeout<F> {
    future: F,
    sleep: Sleep,
    duration: Duration,
}

impl<F> Timeout<F> {
    pub(crate) fn new(duration: Duration, future: F) -> Self {
        Timeout {
            future,
            sleep: sleep(duration),
            duration,
        }
    }
}

impl<F> Future for Timeout<F>
where
    F: Future,
{
    type Output = Result<F::Output, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // SAFETY: `future` is never moved out of the pinned `Timeout`.
        let this = unsafe { self.get_unchecked_mut() };

        let future = unsafe { Pin::new_unchecked(&mut this.future) };
        if let Poll::Ready(value) = future.poll(cx) {
            return Poll::Ready(Ok(value));
        }

        if let Poll::Ready(()) = Pin::new(&mut this.sleep).poll(cx) {
            return Poll::Ready(Err(TaskError::Timeout {
                timeout: this.duration,
            }));
        }

        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuntimeBuilder;
    use crate::runtime::context;

    #[test]
    fn winning_task_releases_guard_timer() {
        let rt = RuntimeBuilder::new().build();

        rt.block_on(async {
            let guarded = with_timeout(Task::resolved(1), Duration::from_secs(5));
            assert_eq!(context::current().pending_timers(), 1);

            assert_eq!(guarded.await.unwrap(), 1);
            assert_eq!(context::current().pending_timers(), 0);
        });
    }

    #[test]
    fn expired_guard_leaves_no_timer_behind() {
        let rt = RuntimeBuilder::new().build();

        rt.block_on(async {
            let (never, _resolver) = Task::<i32>::pair();
            let result = with_timeout(never, Duration::from_millis(5)).await;

            assert!(matches!(result, Err(TaskError::Timeout { .. })));
            assert_eq!(context::current().pending_timers(), 0);
        });
    }
}
