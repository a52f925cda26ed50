//! Errgate - Error Normalization and Safe Execution
//!
//! Runs synchronous, asynchronous and streaming operations under a single
//! failure funnel: every failure is normalized into a `StructuredError`,
//! reported once through a level-filtered `LogGate`, and handed back in the
//! shape of the operation (an `Outcome`, an `Err`, or a failure item on a
//! multicast stream). Combinators (`when`, `map`, `get_or_else`) branch on
//! success and failure uniformly across the three shapes.

pub mod combinators;
pub mod config;
pub mod error;
pub mod log;
pub mod outcome;
pub mod safe;

// Re-export key types for convenience
pub use {
    combinators::{SafeFutureExt, SafeStreamExt, WhenHandle},
    config::{GateSettings, SettingsError},
    error::{
        ErrorAdapter, ErrorFromNative, ErrorVariant, GenericError, Normalizer, ResultExt,
        StructuredError, adapter_for, normalize,
    },
    log::{LogGate, LogLevel, Logger, TracingLogger, log_level, set_log_level, set_logger},
    outcome::Outcome,
    safe::{
        Multicast, NullableStream, SafeStream, Subscription, run_safe_async,
        run_safe_async_nullable, run_safe_stream, run_safe_stream_nullable, run_safe_sync,
    },
};
