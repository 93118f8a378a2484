//! Retry utilities for fallible tasks.
//!
//! The main entry point is [`retry`], which builds a task that re-runs an
//! operation produced by a factory closure until it succeeds, the error is
//! not retryable, or the [`RetryPolicy`] runs out of attempts.

mod backoff;
mod policy;
mod retry;

#[doc(inline)]
pub use backoff::BackoffPolicy;

#[doc(inline)]
pub use policy::{Delay, RetryPolicy};

#[doc(inline)]
pub use retry::retry;
