use crate::diagnostics::Diagnostic;
use crate::error::TaskError;
use crate::runtime::Scheduler;
use crate::task::{Resolver, Task};
use crate::time::{TimerHandle, after};
use crate::tools::policy::RetryPolicy;

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

/// Retries the task produced by `factory` until it fulfills or the policy
/// gives up.
///
/// Attempts are strictly sequential: `factory` is called for attempt `n + 1`
/// only after attempt `n` rejected and the policy's delay for `n` elapsed.
/// At most [`max_attempts`](RetryPolicy::max_attempts) tasks are created.
///
/// Every failed attempt is reported as
/// [`Diagnostic::RetryAttemptFailed`] before anything else happens. Then:
/// - an error the policy does not retry settles the returned task unchanged,
/// - a failure of the last allowed attempt settles it with
///   [`TaskError::RetriesExhausted`], carrying the last error.
///
/// The returned task is cancellable; cancelling it cancels the attempt in
/// flight (if cancellable) or the pending delay.
///
/// # Examples
///
/// ```rust,ignore
/// let policy = RetryPolicy::new(5)?.fixed_delay(Duration::from_secs(1));
/// let result = retry(|| unreliable_operation(), policy).await;
/// ```
pub fn retry<T, F>(factory: F, policy: RetryPolicy) -> Task<T>
where
    T: Clone + 'static,
    F: FnMut() -> Task<T> + 'static,
{
    let (task, resolver) = Task::pair();

    let sequence = Rc::new(Sequence {
        factory: RefCell::new(factory),
        policy,
        resolver: resolver.clone(),
        step: RefCell::new(Step::Idle),
        scheduler: task.scheduler().clone(),
    });

    let weak = Rc::downgrade(&sequence);
    resolver.on_cancel(move || {
        if let Some(sequence) = weak.upgrade() {
            sequence.abort();
        }
    });

    sequence.attempt(1);
    task
}

/// What the sequence is currently waiting on.
enum Step<T> {
    Idle,
    Running(Task<T>),
    Waiting(TimerHandle),
}

struct Sequence<T, F> {
    factory: RefCell<F>,
    policy: RetryPolicy,
    resolver: Resolver<T>,
    step: RefCell<Step<T>>,
    scheduler: Rc<Scheduler>,
}

impl<T, F> Sequence<T, F>
where
    T: Clone + 'static,
    F: FnMut() -> Task<T> + 'static,
{
    fn attempt(self: &Rc<Self>, attempt: u32) {
        if self.resolver.is_settled() {
            return;
        }

        tracing::debug!(
            attempt,
            max_attempts = self.policy.max_attempts(),
            "retry attempt started"
        );

        let task = {
            let mut factory = self.factory.borrow_mut();
            factory()
        };
        *self.step.borrow_mut() = Step::Running(task.clone());

        let sequence = self.clone();
        task.watch(move |result| sequence.on_attempt_settled(attempt, result));
    }

    fn on_attempt_settled(self: &Rc<Self>, attempt: u32, result: Result<T, TaskError>) {
        *self.step.borrow_mut() = Step::Idle;

        if self.resolver.is_settled() {
            return;
        }

        let error = match result {
            Ok(value) => {
                tracing::debug!(attempt, "retry attempt succeeded");
                self.resolver.resolve(value);
                return;
            }
            Err(error) => error,
        };

        let max_attempts = self.policy.max_attempts();
        self.scheduler.report(Diagnostic::RetryAttemptFailed {
            attempt,
            max_attempts,
            error: error.clone(),
        });

        if !self.policy.should_retry(&error) {
            tracing::debug!(attempt, error = error.as_label(), "error not retried");
            self.resolver.reject(error);
            return;
        }

        if attempt >= max_attempts {
            tracing::debug!(attempts = attempt, "retries exhausted");
            self.resolver.reject(TaskError::RetriesExhausted {
                attempts: attempt,
                last_error: Box::new(error),
            });
            return;
        }

        let delay = self.policy.delay_for(attempt);
        if delay.is_zero() {
            self.attempt(attempt + 1);
            return;
        }

        tracing::trace!(?delay, next = attempt + 1, "waiting before next attempt");

        let (timer, handle) = after(delay);
        let sequence = self.clone();
        timer.watch(move |_| sequence.attempt(attempt + 1));
        *self.step.borrow_mut() = Step::Waiting(handle);
    }

    /// Stops the sequence after the retry task was cancelled.
    fn abort(&self) {
        let step = mem::replace(&mut *self.step.borrow_mut(), Step::Idle);

        match step {
            Step::Running(task) => {
                task.cancel();
            }
            Step::Waiting(handle) => {
                handle.cancel();
            }
            Step::Idle => {}
        }
    }
}
