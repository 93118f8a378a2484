use crate::runtime::{TimerSlot, context};

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

/// Creates a future that completes after the given duration.
///
/// The returned sleep future registers a timer with the current
/// runtime and completes once the duration has elapsed.
///
/// # Panics
///
/// Panics if polled outside of a running runtime.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(Duration::from_millis(10)).await;
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    Sleep::new(duration)
}

/// A future that completes once a specific deadline is reached.
///
/// The timer is registered on first poll and cancelled if the future is
/// dropped before completion, so an abandoned sleep never wakes anything.
pub struct Sleep {
    /// Absolute point in time when the sleep completes.
    deadline: Instant,

    /// Waker of the latest poll, shared with the timer callback.
    waker: Rc<RefCell<Option<Waker>>>,

    /// Timer registration; `None` until first polled.
    slot: Option<TimerSlot>,
}

impl Sleep {
    /// Creates a new `Sleep` future that completes after `duration`.
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
            waker: Rc::new(RefCell::new(None)),
            slot: None,
        }
    }

    /// Returns the instant at which the sleep completes.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    fn cancel_timer(&mut self) {
        if let Some(slot) = self.slot.take() {
            let callback = slot.borrow_mut().take();
            drop(callback);
        }
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if Instant::now() >= this.deadline {
            this.cancel_timer();
            return Poll::Ready(());
        }

        *this.waker.borrow_mut() = Some(cx.waker().clone());

        if this.slot.is_none() {
            let waker = this.waker.clone();
            let slot = context::current().schedule_timer(
                this.deadline,
                Box::new(move || {
                    let waker = waker.borrow_mut().take();
                    if let Some(waker) = waker {
                        waker.wake();
                    }
                }),
            );
            this.slot = Some(slot);
        }

        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
