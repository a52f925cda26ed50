//! Safe execution of streaming operations.

use std::panic::{AssertUnwindSafe, catch_unwind};

use {
    anyhow::Error,
    futures::{
        Stream, StreamExt,
        future::ready,
        stream::{BoxStream, once},
    },
};

use crate::{
    error::{Normalizer, PanicFailure, StructuredError},
    safe::multicast::Multicast,
};

/// Multicast stream whose failures are `Err(StructuredError)` items.
pub type SafeStream<T> = Multicast<Result<T, StructuredError>>;

/// Multicast stream whose failures were replaced by `None`.
pub type NullableStream<T> = Multicast<Option<T>>;

impl Normalizer {
    /// Wraps the stream produced by `operation`.
    ///
    /// Values are relayed unchanged. Every upstream `Err` (or panic) is
    /// normalized and relayed as an `Err(StructuredError)` item; a failure
    /// item does not end the stream.
    ///
    /// # Arguments
    ///
    /// * `operation` - Produces the upstream stream.
    ///
    /// # Returns
    ///
    /// A `SafeStream` that starts the upstream on first subscription.
    pub fn run_stream<T, E, F, S>(&self, operation: F) -> SafeStream<T>
    where
        F: FnOnce() -> S,
        S: Stream<Item = Result<T, E>> + Send + 'static,
        T: Clone + Send + 'static,
        E: Into<Error> + Send + 'static,
    {
        Multicast::new(self.guard_stream(operation))
    }

    /// Like `run_stream`, but failures become `None` items after being
    /// normalized and reported. The stream only ends when the upstream
    /// completes.
    pub fn run_stream_nullable<T, E, F, S>(&self, operation: F) -> NullableStream<T>
    where
        F: FnOnce() -> S,
        S: Stream<Item = Result<T, E>> + Send + 'static,
        T: Clone + Send + 'static,
        E: Into<Error> + Send + 'static,
    {
        Multicast::new(self.guard_stream(operation).map(Result::ok))
    }

    fn guard_stream<T, E, F, S>(
        &self,
        operation: F,
    ) -> BoxStream<'static, Result<T, StructuredError>>
    where
        F: FnOnce() -> S,
        S: Stream<Item = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Into<Error> + Send + 'static,
    {
        match catch_unwind(AssertUnwindSafe(operation)) {
            Ok(upstream) => normalized(self.clone(), upstream),
            Err(payload) => {
                let error = self.normalize(PanicFailure::from_payload(payload));
                once(ready(Err(error))).boxed()
            }
        }
    }
}

fn normalized<T, E, S>(
    normalizer: Normalizer,
    upstream: S,
) -> BoxStream<'static, Result<T, StructuredError>>
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Into<Error> + Send + 'static,
{
    AssertUnwindSafe(upstream)
        .catch_unwind()
        .map(move |item| match item {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(failure)) => Err(normalizer.normalize(failure)),
            Err(payload) => Err(normalizer.normalize(PanicFailure::from_payload(payload))),
        })
        .boxed()
}

/// Wraps a stream with the process-wide normalizer.
pub fn run_safe_stream<T, E, F, S>(operation: F) -> SafeStream<T>
where
    F: FnOnce() -> S,
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Clone + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    Normalizer::default().run_stream(operation)
}

/// Wraps a stream with the process-wide normalizer, replacing failures
/// with `None`.
pub fn run_safe_stream_nullable<T, E, F, S>(operation: F) -> NullableStream<T>
where
    F: FnOnce() -> S,
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Clone + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    Normalizer::default().run_stream_nullable(operation)
}
