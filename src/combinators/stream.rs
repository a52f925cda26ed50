//! Combinators on streams of `Result` items.

use std::{convert::identity, pin::pin};

use {
    anyhow::Error,
    futures::{Stream, StreamExt},
    tokio::{spawn, task::JoinHandle},
};

use crate::{
    combinators::{branch, trace},
    error::{Normalizer, StructuredError},
};

/// Handle to a stream being consumed by `SafeStreamExt::when`.
///
/// Dropping the handle detaches it; the consumer keeps running.
#[derive(Debug)]
pub struct WhenHandle {
    task: JoinHandle<()>,
}

impl WhenHandle {
    /// Stops consuming the stream. The stream is dropped, which cancels a
    /// `Subscription` upstream of it.
    pub fn cancel(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the consumer to stop.
    ///
    /// # Returns
    ///
    /// `true` if the stream ran to completion, `false` if it was cancelled
    /// or a handler panicked.
    pub async fn finished(self) -> bool {
        self.task.await.is_ok()
    }
}

/// Success/failure branching for any `Stream<Item = Result<T, E>>`.
///
/// Errors are normalized before reaching `on_error` unless they already
/// are a `StructuredError`. The `_with` variants report through the given
/// normalizer instead of `Normalizer::default()`.
pub trait SafeStreamExt<T, E>: Stream<Item = Result<T, E>> + Sized
where
    E: Into<Error>,
{
    /// Consumes the stream on a `tokio` task, calling `on_success` per value
    /// and `on_error` per failure.
    ///
    /// # Panics
    ///
    /// Panics if called outside a `tokio` runtime.
    fn when<S, F>(self, on_success: S, on_error: F) -> WhenHandle
    where
        Self: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        S: FnMut(T) + Send + 'static,
        F: FnMut(StructuredError) + Send + 'static,
    {
        self.when_started_with(Normalizer::default(), || {}, on_success, on_error)
    }

    /// Like `when`, but calls `on_start` once at subscription time.
    ///
    /// # Panics
    ///
    /// Panics if called outside a `tokio` runtime.
    fn when_started<B, S, F>(self, on_start: B, on_success: S, on_error: F) -> WhenHandle
    where
        Self: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        B: FnOnce(),
        S: FnMut(T) + Send + 'static,
        F: FnMut(StructuredError) + Send + 'static,
    {
        self.when_started_with(Normalizer::default(), on_start, on_success, on_error)
    }

    fn when_with<S, F>(self, normalizer: Normalizer, on_success: S, on_error: F) -> WhenHandle
    where
        Self: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        S: FnMut(T) + Send + 'static,
        F: FnMut(StructuredError) + Send + 'static,
    {
        self.when_started_with(normalizer, || {}, on_success, on_error)
    }

    /// `when_started` reporting through `normalizer`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a `tokio` runtime.
    fn when_started_with<B, S, F>(
        self,
        normalizer: Normalizer,
        on_start: B,
        mut on_success: S,
        mut on_error: F,
    ) -> WhenHandle
    where
        Self: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        B: FnOnce(),
        S: FnMut(T) + Send + 'static,
        F: FnMut(StructuredError) + Send + 'static,
    {
        trace(normalizer.gate(), normalizer.level_override(), "Stream", "when");
        on_start();
        let task = spawn(async move {
            let mut stream = pin!(self);
            while let Some(item) = stream.next().await {
                let settled = item.map_err(|failure| normalizer.structure(failure));
                branch(settled, &mut on_success, &mut on_error);
            }
        });
        WhenHandle { task }
    }

    /// Maps every value through `on_success` and every failure through
    /// `on_error`; failures become ordinary items.
    fn map_outcome<R, S, F>(self, on_success: S, on_error: F) -> impl Stream<Item = R>
    where
        S: FnMut(T) -> R,
        F: FnMut(StructuredError) -> R,
    {
        self.map_outcome_with(Normalizer::default(), on_success, on_error)
    }

    /// `map_outcome` reporting through `normalizer`.
    fn map_outcome_with<R, S, F>(
        self,
        normalizer: Normalizer,
        mut on_success: S,
        mut on_error: F,
    ) -> impl Stream<Item = R>
    where
        S: FnMut(T) -> R,
        F: FnMut(StructuredError) -> R,
    {
        trace(normalizer.gate(), normalizer.level_override(), "Stream", "map");
        self.map(move |item| {
            let settled = item.map_err(|failure| normalizer.structure(failure));
            branch(settled, &mut on_success, &mut on_error)
        })
    }

    /// Passes values through and replaces each failure with a fallback.
    fn get_or_else<F>(self, on_error: F) -> impl Stream<Item = T>
    where
        F: FnMut(StructuredError) -> T,
    {
        self.map_outcome(identity, on_error)
    }

    fn get_or_else_with<F>(self, normalizer: Normalizer, on_error: F) -> impl Stream<Item = T>
    where
        F: FnMut(StructuredError) -> T,
    {
        self.map_outcome_with(normalizer, identity, on_error)
    }
}

impl<T, E, St> SafeStreamExt<T, E> for St
where
    St: Stream<Item = Result<T, E>>,
    E: Into<Error>,
{
}
