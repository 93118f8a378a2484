//! Cancellation controller and token.
//!
//! The controller is the only party that can cancel; the token is a
//! read-only view handed to the work being cancelled. Once cancelled, a token
//! stays cancelled.
//!
//! ```rust,ignore
//! let (token, controller) = cancellation();
//!
//! let task = Task::with_token(&token, |resolver| {
//!     let (timer, handle) = after(Duration::from_secs(3));
//!     resolver.on_cancel(move || {
//!         handle.cancel();
//!     });
//!     let done = resolver.clone();
//!     timer.map(move |()| done.resolve("finished"));
//! });
//!
//! controller.cancel();
//! assert!(matches!(task.await, Err(TaskError::Cancelled)));
//! ```

use crate::diagnostics::Diagnostic;
use crate::runtime::context;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Something that settles itself as cancelled when a token fires.
pub(crate) trait CancelTarget {
    /// Cancels the target; returns `false` if it had already settled.
    fn cancel_by_token(self: Rc<Self>) -> bool;

    /// Returns `true` while cancelling would still have an effect.
    fn is_live(&self) -> bool;
}

#[derive(Default)]
struct TokenState {
    cancelled: Cell<bool>,
    observers: RefCell<Vec<Rc<dyn CancelTarget>>>,
    wakers: RefCell<Vec<Waker>>,
}

/// Creates a linked token and controller.
///
/// Equivalent to `CancellationController::new()` followed by `token()`.
pub fn cancellation() -> (CancellationToken, CancellationController) {
    let controller = CancellationController::new();
    (controller.token(), controller)
}

/// The capability to cancel.
///
/// Cancelling is idempotent: the first [`cancel`](Self::cancel) call settles
/// every observing task as `Rejected(Cancelled)`, synchronously and in the
/// order the tasks were created; later calls do nothing.
pub struct CancellationController {
    state: Rc<TokenState>,
}

impl CancellationController {
    /// Creates a controller whose token is not cancelled.
    pub fn new() -> Self {
        Self {
            state: Rc::new(TokenState::default()),
        }
    }

    /// Returns a token observing this controller.
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            state: self.state.clone(),
        }
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Cancels the token.
    ///
    /// Returns `true` on the first call. The cancellation is reported to the
    /// diagnostic sink of the running runtime, if any.
    pub fn cancel(&self) -> bool {
        if self.state.cancelled.replace(true) {
            return false;
        }

        let observers = mem::take(&mut *self.state.observers.borrow_mut());
        let wakers = mem::take(&mut *self.state.wakers.borrow_mut());

        let mut cancelled = 0;
        for observer in observers {
            if observer.cancel_by_token() {
                cancelled += 1;
            }
        }

        for waker in wakers {
            waker.wake();
        }

        tracing::debug!(observers = cancelled, "cancellation requested");

        if let Some(scheduler) = context::try_current() {
            scheduler.report(Diagnostic::OperationCancelled {
                observers: cancelled,
            });
        }

        true
    }
}

impl Default for CancellationController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationController")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Read-only view of a cancellation signal.
#[derive(Clone)]
pub struct CancellationToken {
    state: Rc<TokenState>,
}

impl CancellationToken {
    /// Returns `true` once the controller has cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Returns a future that completes when the token is cancelled.
    pub fn cancelled(&self) -> WaitForCancellation {
        WaitForCancellation {
            token: self.clone(),
        }
    }

    /// Registers a target to cancel when the controller fires.
    ///
    /// The token keeps the target alive until it settles, even if every
    /// handle to it is gone. Settled targets are pruned so that a long-lived
    /// token does not accumulate observers of finished tasks.
    pub(crate) fn observe(&self, target: Rc<dyn CancelTarget>) {
        let mut observers = self.state.observers.borrow_mut();
        observers.retain(|observer| observer.is_live());
        observers.push(target);
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Future returned by [`CancellationToken::cancelled`].
pub struct WaitForCancellation {
    token: CancellationToken,
}

impl Future for WaitForCancellation {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.token.is_cancelled() {
            return Poll::Ready(());
        }

        let mut wakers = self.token.state.wakers.borrow_mut();
        if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            wakers.push(cx.waker().clone());
        }

        Poll::Pending
    }
}
