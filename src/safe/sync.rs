//! Safe execution of synchronous operations.

use std::panic::{AssertUnwindSafe, catch_unwind};

use anyhow::Error;

use crate::{
    error::{Normalizer, PanicFailure},
    outcome::Outcome,
};

impl Normalizer {
    /// Runs `operation` immediately and captures its outcome.
    ///
    /// Both an `Err` return and an unwinding panic are normalized; nothing
    /// escapes this call.
    ///
    /// # Arguments
    ///
    /// * `operation` - The fallible operation to run.
    ///
    /// # Returns
    ///
    /// `Outcome::Success` with the returned value, or `Outcome::Failure`
    /// with the normalized error.
    pub fn run_sync<T, E, F>(&self, operation: F) -> Outcome<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<Error>,
    {
        match catch_unwind(AssertUnwindSafe(operation)) {
            Ok(Ok(value)) => Outcome::success(value),
            Ok(Err(failure)) => Outcome::failure(self.normalize(failure)),
            Err(payload) => Outcome::failure(self.normalize(PanicFailure::from_payload(payload))),
        }
    }
}

/// Runs `operation` with the process-wide normalizer.
pub fn run_safe_sync<T, E, F>(operation: F) -> Outcome<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Error>,
{
    Normalizer::default().run_sync(operation)
}
