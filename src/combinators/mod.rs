//! Success/failure branching over outcomes, futures and streams.
//!
//! All three shapes share one dispatch function; each shape only adapts it
//! to its own way of producing values (direct, awaited, or iterated).

pub mod future;
pub mod outcome;
pub mod stream;

use crate::log::{LogGate, LogLevel};

pub use {
    future::SafeFutureExt,
    stream::{SafeStreamExt, WhenHandle},
};

/// Invokes exactly one of the two handlers. Success takes precedence.
pub(crate) fn branch<T, E, R>(
    settled: Result<T, E>,
    on_success: impl FnOnce(T) -> R,
    on_error: impl FnOnce(E) -> R,
) -> R {
    match settled {
        Ok(value) => on_success(value),
        Err(error) => on_error(error),
    }
}

/// Emits a debug trace for a combinator invocation on `gate`.
pub(crate) fn trace(
    gate: &LogGate,
    level_override: Option<LogLevel>,
    shape: &str,
    combinator: &str,
) {
    gate.log_debug(&format!("{shape}::{combinator} invoked"), level_override);
}
