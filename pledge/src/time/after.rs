use crate::runtime::TimerSlot;
use crate::task::Task;

use std::fmt;
use std::time::{Duration, Instant};

/// Creates a task that fulfills with `()` once `delay` has elapsed.
///
/// The timer is registered immediately. Timers sharing a deadline fire in
/// the order they were created. A zero delay fires on the next scheduler
/// turn, never synchronously.
///
/// The returned [`TimerHandle`] can cancel the timer before it fires; a
/// cancelled timer never settles its task.
///
/// # Panics
///
/// Panics if called outside of a running runtime.
///
/// # Examples
///
/// ```rust,ignore
/// let (timer, _handle) = after(Duration::from_millis(50));
/// timer.await.unwrap();
/// ```
pub fn after(delay: Duration) -> (Task<()>, TimerHandle) {
    let (task, resolver) = Task::pair();
    let deadline = Instant::now() + delay;

    let slot = task.scheduler().schedule_timer(
        deadline,
        Box::new(move || {
            resolver.resolve(());
        }),
    );

    tracing::trace!(?delay, "timer scheduled");

    (task, TimerHandle { slot })
}

/// Handle to a timer created by [`after`].
///
/// Dropping the handle does **not** cancel the timer.
pub struct TimerHandle {
    slot: TimerSlot,
}

impl TimerHandle {
    /// Cancels the timer.
    ///
    /// Returns `true` if the timer was still pending. Its callback is dropped
    /// right away, so the task it would have fulfilled stays pending forever.
    /// Cancelling a fired or already cancelled timer is a no-op returning
    /// `false`.
    pub fn cancel(&self) -> bool {
        let callback = self.slot.borrow_mut().take();
        let cancelled = callback.is_some();
        drop(callback);

        if cancelled {
            tracing::trace!("timer cancelled");
        }
        cancelled
    }

    /// Returns `true` while the timer has neither fired nor been cancelled.
    pub fn is_pending(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("pending", &self.is_pending())
            .finish()
    }
}
