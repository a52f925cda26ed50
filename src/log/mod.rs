//! Level-filtered, pluggable diagnostic output.
//!
//! This module provides the `LogGate` configuration object, the `Logger`
//! capability trait, and a `tracing`-backed logger.

pub mod gate;
#[cfg(test)]
pub(crate) mod testing;
pub mod tracing_logger;

pub use {
    gate::{
        LevelParseError, LogGate, LogLevel, Logger, clear_logger, log_debug, log_error, log_info,
        log_level, log_warning, set_log_level, set_logger,
    },
    tracing_logger::TracingLogger,
};
