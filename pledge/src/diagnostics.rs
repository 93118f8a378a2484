//! Diagnostic reporting boundary.
//!
//! The runtime never decides how problems are displayed. Anything worth
//! surfacing that has no caller to return to (a rejection nobody handled, a
//! failed retry attempt, a cancellation) is turned into a [`Diagnostic`] and
//! handed to the [`DiagnosticSink`] installed on the runtime.
//!
//! [`LogSink`] is the default and forwards events to `tracing`.
//! [`MemorySink`] keeps them in memory, which is what tests want.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::TaskError;

/// An event reported to the diagnostic sink.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// A task was rejected and nothing observed the rejection by the end of
    /// the scheduler turn.
    UnhandledRejection {
        /// The rejection reason.
        error: TaskError,
    },

    /// One attempt of a retry sequence failed.
    RetryAttemptFailed {
        /// 1-based number of the failed attempt.
        attempt: u32,
        /// The policy's attempt ceiling.
        max_attempts: u32,
        /// Why the attempt failed.
        error: TaskError,
    },

    /// A cancellation controller fired.
    OperationCancelled {
        /// Number of tasks that were observing the token.
        observers: usize,
    },
}

impl Diagnostic {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Diagnostic::UnhandledRejection { .. } => "unhandled_rejection",
            Diagnostic::RetryAttemptFailed { .. } => "retry_attempt_failed",
            Diagnostic::OperationCancelled { .. } => "operation_cancelled",
        }
    }
}

/// Receiver of runtime diagnostics.
///
/// Implementations are called on the runtime thread, synchronously, at the
/// point where the event happens.
pub trait DiagnosticSink {
    /// Handles a single event.
    fn report(&self, event: &Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Rc<S> {
    fn report(&self, event: &Diagnostic) {
        (**self).report(event)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Box<S> {
    fn report(&self, event: &Diagnostic) {
        (**self).report(event)
    }
}

/// Sink that writes every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, event: &Diagnostic) {
        match event {
            Diagnostic::UnhandledRejection { error } => {
                tracing::error!(label = error.as_label(), %error, "unhandled task rejection");
            }
            Diagnostic::RetryAttemptFailed {
                attempt,
                max_attempts,
                error,
            } => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    label = error.as_label(),
                    %error,
                    "retry attempt failed"
                );
            }
            Diagnostic::OperationCancelled { observers } => {
                tracing::info!(observers, "operation cancelled");
            }
        }
    }
}

/// Sink that records events in memory.
///
/// Share it with the runtime through an `Rc` and inspect it afterwards:
///
/// ```rust,ignore
/// let sink = Rc::new(MemorySink::new());
/// let runtime = RuntimeBuilder::new().diagnostic_sink(sink.clone()).build();
/// runtime.block_on(async { /* ... */ });
/// assert!(sink.events().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every event recorded so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.borrow().clone()
    }

    /// Returns the labels of the recorded events, in order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(Diagnostic::as_label).collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Drops every recorded event.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, event: &Diagnostic) {
        self.events.borrow_mut().push(event.clone());
    }
}
