use crate::error::TaskError;

/// Per-task result reported by [`settle_all`](crate::settle_all).
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// The task fulfilled with a value.
    Fulfilled(T),

    /// The task rejected.
    Rejected(TaskError),
}

impl<T> Outcome<T> {
    /// Returns `true` for [`Outcome::Fulfilled`].
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Returns `true` for [`Outcome::Rejected`].
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// The fulfilled value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// The rejection reason, if any.
    pub fn error(&self) -> Option<&TaskError> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(error) => Some(error),
        }
    }

    /// Converts the outcome back into a `Result`.
    pub fn into_result(self) -> Result<T, TaskError> {
        self.into()
    }
}

impl<T> From<Result<T, TaskError>> for Outcome<T> {
    fn from(result: Result<T, TaskError>) -> Self {
        match result {
            Ok(value) => Outcome::Fulfilled(value),
            Err(error) => Outcome::Rejected(error),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, TaskError> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(error) => Err(error),
        }
    }
}
