use crate::error::{PolicyError, TaskError};
use crate::tools::backoff::BackoffPolicy;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// How long to wait between two attempts.
#[derive(Clone, Default)]
pub enum Delay {
    /// Retry right away.
    #[default]
    None,
    /// Wait the same duration after every failed attempt.
    Fixed(Duration),
    /// Wait according to an exponential backoff.
    Backoff(BackoffPolicy),
    /// Compute the wait from the number of the attempt that just failed.
    Custom(Rc<dyn Fn(u32) -> Duration>),
}

impl Delay {
    /// Returns the wait that follows failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Delay::None => Duration::ZERO,
            Delay::Fixed(delay) => *delay,
            Delay::Backoff(backoff) => backoff.delay_for(attempt),
            Delay::Custom(f) => f(attempt),
        }
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delay::None => f.write_str("None"),
            Delay::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            Delay::Backoff(backoff) => f.debug_tuple("Backoff").field(backoff).finish(),
            Delay::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Configuration of a [`retry`](crate::retry) sequence.
///
/// Built with [`RetryPolicy::new`] and refined with the builder methods.
/// The policy is moved into the retry executor and cannot change while the
/// sequence runs.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use pledge::RetryPolicy;
///
/// let policy = RetryPolicy::new(5)
///     .unwrap()
///     .fixed_delay(Duration::from_secs(1));
///
/// assert_eq!(policy.max_attempts(), 5);
/// assert_eq!(policy.delay_for(3), Duration::from_secs(1));
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Delay,
    retry_if: Rc<dyn Fn(&TaskError) -> bool>,
}

impl RetryPolicy {
    /// Creates a policy allowing at most `max_attempts` factory calls, with
    /// no delay between attempts.
    ///
    /// Errors are retried when [`TaskError::is_retryable`] says so.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ZeroAttempts`] if `max_attempts` is `0`.
    pub fn new(max_attempts: u32) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }

        Ok(Self {
            max_attempts,
            delay: Delay::None,
            retry_if: Rc::new(TaskError::is_retryable),
        })
    }

    /// Sets the delay strategy.
    pub fn delay(mut self, delay: Delay) -> Self {
        self.delay = delay;
        self
    }

    /// Waits `delay` after every failed attempt.
    pub fn fixed_delay(self, delay: Duration) -> Self {
        self.delay(Delay::Fixed(delay))
    }

    /// Waits according to `backoff` after every failed attempt.
    pub fn backoff(self, backoff: BackoffPolicy) -> Self {
        self.delay(Delay::Backoff(backoff))
    }

    /// Computes the wait from the failed attempt number.
    pub fn delay_fn(self, f: impl Fn(u32) -> Duration + 'static) -> Self {
        self.delay(Delay::Custom(Rc::new(f)))
    }

    /// Retries only errors for which `predicate` returns `true`.
    ///
    /// Any other error settles the retry task unchanged.
    pub fn retry_if(mut self, predicate: impl Fn(&TaskError) -> bool + 'static) -> Self {
        self.retry_if = Rc::new(predicate);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the wait that follows failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay.delay_for(attempt)
    }

    /// Returns `true` if `error` allows another attempt.
    pub fn should_retry(&self, error: &TaskError) -> bool {
        (self.retry_if)(error)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
