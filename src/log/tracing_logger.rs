//! `Logger` implementation that forwards to `tracing`.
//!
//! Applications that already install a `tracing` subscriber can plug this
//! into the gate and get every normalized failure as a structured event.

use std::{backtrace::Backtrace, error::Error as StdError};

use tracing::{debug, error, info, warn};

use crate::log::gate::Logger;

/// Forwards gate output to the `tracing` macros of the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log_debug(&self, message: &str) {
        debug!(target: "errgate", "{message}");
    }

    fn log_info(&self, message: &str) {
        info!(target: "errgate", "{message}");
    }

    fn log_warning(&self, message: &str) {
        warn!(target: "errgate", "{message}");
    }

    fn log_error(
        &self,
        message: &str,
        failure: Option<&(dyn StdError + 'static)>,
        stack: Option<&Backtrace>,
    ) {
        match (failure, stack) {
            (Some(failure), Some(stack)) => {
                error!(target: "errgate", error = %failure, stack = %stack, "{message}");
            }
            (Some(failure), None) => {
                error!(target: "errgate", error = %failure, "{message}");
            }
            (None, Some(stack)) => {
                error!(target: "errgate", stack = %stack, "{message}");
            }
            (None, None) => {
                error!(target: "errgate", "{message}");
            }
        }
    }
}
