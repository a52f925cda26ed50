//! Combinators on `Outcome`.

use std::convert::identity;

use crate::{
    combinators::{branch, trace},
    error::StructuredError,
    log::LogGate,
    outcome::Outcome,
};

impl<T> Outcome<T> {
    /// Calls `on_success` with the value or `on_error` with the error.
    pub fn when(&self, on_success: impl FnOnce(&T), on_error: impl FnOnce(&StructuredError)) {
        trace(&LogGate::global(), None, "Outcome", "when");
        let settled = match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        };
        branch(settled, on_success, on_error);
    }

    /// Projects either branch into a common type `R`.
    ///
    /// Only the handler for the populated slot is invoked.
    pub fn map<R>(
        self,
        on_success: impl FnOnce(T) -> R,
        on_error: impl FnOnce(StructuredError) -> R,
    ) -> R {
        trace(&LogGate::global(), None, "Outcome", "map");
        branch(self.into_result(), on_success, on_error)
    }

    /// Returns the value, or the fallback computed from the error.
    pub fn get_or_else(self, on_error: impl FnOnce(StructuredError) -> T) -> T {
        self.map(identity, on_error)
    }
}
