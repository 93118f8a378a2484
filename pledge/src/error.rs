//! Error types shared by every Pledge primitive.
//!
//! - [`TaskError`] is the rejection reason carried by a [`Task`](crate::Task).
//! - [`OperationError`] is the domain failure raised by user-supplied work.
//! - [`PolicyError`] is returned when a retry policy is misconfigured.
//!
//! Rejections travel through combinators unchanged. Only the timeout guard
//! (which produces [`TaskError::Timeout`]) and the retry executor (which wraps
//! the last failure in [`TaskError::RetriesExhausted`]) create new errors.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Reason a task was rejected.
///
/// `TaskError` is cheap to clone so that every continuation registered on a
/// task can receive its own copy of the rejection.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// Failure raised by the work itself.
    #[error("operation failed: {0}")]
    Operation(#[from] OperationError),

    /// The task was cancelled through its token or its cancel hook.
    #[error("operation cancelled")]
    Cancelled,

    /// The timeout guard fired before the task settled.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Every attempt allowed by the retry policy failed.
    #[error("gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of times the task factory was invoked.
        attempts: u32,
        /// The rejection of the final attempt.
        #[source]
        last_error: Box<TaskError>,
    },
}

impl TaskError {
    /// Builds an [`TaskError::Operation`] from a message.
    ///
    /// # Example
    /// ```
    /// use pledge::TaskError;
    ///
    /// let err = TaskError::operation("resource 8 unavailable");
    /// assert_eq!(err.to_string(), "operation failed: resource 8 unavailable");
    /// ```
    pub fn operation(message: impl Into<String>) -> Self {
        TaskError::Operation(OperationError::new(message))
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Operation(_) => "task_operation_failed",
            TaskError::Cancelled => "task_cancelled",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::RetriesExhausted { .. } => "task_retries_exhausted",
        }
    }

    /// Indicates whether another attempt may succeed.
    ///
    /// Operation failures and timeouts are retryable. Cancellation and
    /// exhausted retries are final.
    ///
    /// # Example
    /// ```
    /// use pledge::TaskError;
    ///
    /// assert!(TaskError::operation("flaky").is_retryable());
    /// assert!(!TaskError::Cancelled.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::Operation(_) | TaskError::Timeout { .. })
    }

    /// Returns `true` for [`TaskError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }

    /// Returns `true` for [`TaskError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }
}

/// Domain failure raised by user-supplied work.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct OperationError {
    message: String,
    #[source]
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl OperationError {
    /// Creates an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error that keeps the underlying cause as its source.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// The human-readable failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Invalid retry policy configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A policy must allow at least one attempt.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}
