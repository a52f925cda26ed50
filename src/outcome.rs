//! Two-armed container for the outcome of a safely executed operation.

use crate::error::StructuredError;

/// Exactly one of a success value or a `StructuredError`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The operation returned normally.
    Success(T),
    /// The operation failed; the failure has been normalized.
    Failure(StructuredError),
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    pub fn failure(error: StructuredError) -> Self {
        Outcome::Failure(error)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Returns the success value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Returns the error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&StructuredError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn into_error(self) -> Option<StructuredError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    /// Converts into a standard `Result` for use with `?`.
    pub fn into_result(self) -> Result<T, StructuredError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

impl<T> From<Result<T, StructuredError>> for Outcome<T> {
    fn from(result: Result<T, StructuredError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, StructuredError> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_result()
    }
}
