//! Safe execution of single-result asynchronous operations.

use std::{
    future::Future,
    panic::{AssertUnwindSafe, catch_unwind},
};

use {anyhow::Error, futures::FutureExt};

use crate::error::{Normalizer, PanicFailure, StructuredError};

impl Normalizer {
    /// Awaits the future produced by `operation`, normalizing any failure.
    ///
    /// The failure is not swallowed: it is returned as `Err`, now guaranteed
    /// to be a `StructuredError`. Panics while creating or polling the
    /// future are treated as failures too.
    ///
    /// # Arguments
    ///
    /// * `operation` - Produces the future to await.
    ///
    /// # Returns
    ///
    /// The future's value, or the normalized error.
    ///
    /// # Errors
    ///
    /// Returns the normalized `StructuredError` if the future resolves to
    /// `Err` or panics.
    pub async fn run_async<T, E, F, Fut>(&self, operation: F) -> Result<T, StructuredError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Error>,
    {
        let future = match catch_unwind(AssertUnwindSafe(operation)) {
            Ok(future) => future,
            Err(payload) => return Err(self.normalize(PanicFailure::from_payload(payload))),
        };

        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(failure)) => Err(self.normalize(failure)),
            Err(payload) => Err(self.normalize(PanicFailure::from_payload(payload))),
        }
    }

    /// Like `run_async`, but falls back to `None` after normalizing and
    /// reporting the failure.
    pub async fn run_async_nullable<T, E, F, Fut>(&self, operation: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Error>,
    {
        self.run_async(operation).await.ok()
    }
}

/// Runs `operation` with the process-wide normalizer.
///
/// # Errors
///
/// Returns the normalized `StructuredError` on failure.
pub async fn run_safe_async<T, E, F, Fut>(operation: F) -> Result<T, StructuredError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    Normalizer::default().run_async(operation).await
}

/// Runs `operation` with the process-wide normalizer, yielding `None` on
/// failure.
pub async fn run_safe_async_nullable<T, E, F, Fut>(operation: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    Normalizer::default().run_async_nullable(operation).await
}
