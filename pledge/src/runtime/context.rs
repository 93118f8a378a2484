use super::scheduler::Scheduler;

use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    /// Thread-local handle to the scheduler of the runtime being driven.
    ///
    /// This is set while `block_on` runs and allows tasks, timers and
    /// combinators to reach the scheduler without explicit parameter passing.
    static CURRENT_SCHEDULER: RefCell<Option<Rc<Scheduler>>> = const { RefCell::new(None) };
}

/// Restores the previously installed scheduler when dropped, so that a panic
/// inside the runtime does not leave a stale context behind.
struct ContextGuard {
    previous: Option<Rc<Scheduler>>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_SCHEDULER.with(|cell| {
            cell.replace(previous);
        });
    }
}

/// Enters the runtime execution context for the current thread.
///
/// The scheduler is installed for the duration of `f` and the previous
/// context is restored afterwards.
pub(crate) fn enter_context<R>(scheduler: Rc<Scheduler>, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_SCHEDULER.with(|cell| cell.replace(Some(scheduler)));
    let _guard = ContextGuard { previous };

    f()
}

/// Returns the scheduler of the running runtime, if any.
pub(crate) fn try_current() -> Option<Rc<Scheduler>> {
    CURRENT_SCHEDULER.with(|cell| cell.borrow().clone())
}

/// Returns the scheduler of the running runtime.
///
/// # Panics
///
/// Panics if called outside of [`Runtime::block_on`](crate::Runtime::block_on).
pub(crate) fn current() -> Rc<Scheduler> {
    try_current().expect("must be called within the context of a Pledge runtime")
}
