//! Combinators on futures resolving to `Result`.

use std::{convert::identity, future::Future};

use anyhow::Error;

use crate::{
    combinators::{branch, trace},
    error::{Normalizer, StructuredError},
};

/// Success/failure branching for any `Future<Output = Result<T, E>>`.
///
/// Errors reaching `on_error` are normalized first unless they already are
/// a `StructuredError`. The plain methods report through
/// `Normalizer::default()`; the `_with` variants take the normalizer (and
/// so the gate and adapter) to use.
pub trait SafeFutureExt<T, E>: Future<Output = Result<T, E>> + Sized
where
    E: Into<Error>,
{
    /// Awaits the future and calls exactly one handler.
    fn when<S, F>(self, on_success: S, on_error: F) -> impl Future<Output = ()>
    where
        S: FnOnce(T),
        F: FnOnce(StructuredError),
    {
        self.when_with(Normalizer::default(), on_success, on_error)
    }

    fn when_with<S, F>(
        self,
        normalizer: Normalizer,
        on_success: S,
        on_error: F,
    ) -> impl Future<Output = ()>
    where
        S: FnOnce(T),
        F: FnOnce(StructuredError),
    {
        self.when_started_with(normalizer, || {}, on_success, on_error)
    }

    /// Like `when`, but calls `on_start` right away, before the returned
    /// future is polled.
    fn when_started<B, S, F>(
        self,
        on_start: B,
        on_success: S,
        on_error: F,
    ) -> impl Future<Output = ()>
    where
        B: FnOnce(),
        S: FnOnce(T),
        F: FnOnce(StructuredError),
    {
        self.when_started_with(Normalizer::default(), on_start, on_success, on_error)
    }

    /// `when_started` reporting through `normalizer`.
    fn when_started_with<B, S, F>(
        self,
        normalizer: Normalizer,
        on_start: B,
        on_success: S,
        on_error: F,
    ) -> impl Future<Output = ()>
    where
        B: FnOnce(),
        S: FnOnce(T),
        F: FnOnce(StructuredError),
    {
        trace(normalizer.gate(), normalizer.level_override(), "Future", "when");
        on_start();
        async move {
            let settled = self.await.map_err(|failure| normalizer.structure(failure));
            branch(settled, on_success, on_error);
        }
    }

    /// Settles into the chosen handler's return value; never fails.
    fn map_outcome<R, S, F>(self, on_success: S, on_error: F) -> impl Future<Output = R>
    where
        S: FnOnce(T) -> R,
        F: FnOnce(StructuredError) -> R,
    {
        self.map_outcome_with(Normalizer::default(), on_success, on_error)
    }

    /// `map_outcome` reporting through `normalizer`.
    fn map_outcome_with<R, S, F>(
        self,
        normalizer: Normalizer,
        on_success: S,
        on_error: F,
    ) -> impl Future<Output = R>
    where
        S: FnOnce(T) -> R,
        F: FnOnce(StructuredError) -> R,
    {
        trace(normalizer.gate(), normalizer.level_override(), "Future", "map");
        async move {
            let settled = self.await.map_err(|failure| normalizer.structure(failure));
            branch(settled, on_success, on_error)
        }
    }

    /// Resolves to the value, or to the fallback computed from the error.
    fn get_or_else<F>(self, on_error: F) -> impl Future<Output = T>
    where
        F: FnOnce(StructuredError) -> T,
    {
        self.map_outcome(identity, on_error)
    }

    fn get_or_else_with<F>(self, normalizer: Normalizer, on_error: F) -> impl Future<Output = T>
    where
        F: FnOnce(StructuredError) -> T,
    {
        self.map_outcome_with(normalizer, identity, on_error)
    }
}

impl<T, E, Fut> SafeFutureExt<T, E> for Fut
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
}
