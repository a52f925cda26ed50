//! Recording logger used by unit tests across the crate.

use std::{backtrace::Backtrace, error::Error as StdError};

use parking_lot::Mutex;

use crate::log::gate::{LogLevel, Logger};

/// One call received by a `RecordingLogger`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Display of the failure passed to `log_error`, if any.
    pub failure: Option<String>,
}

/// Logger that keeps every call in memory.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn count_at(&self, level: LogLevel) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == level)
            .count()
    }

    fn record(&self, level: LogLevel, message: &str, failure: Option<String>) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.to_string(),
            failure,
        });
    }
}

impl Logger for RecordingLogger {
    fn log_debug(&self, message: &str) {
        self.record(LogLevel::Debug, message, None);
    }

    fn log_info(&self, message: &str) {
        self.record(LogLevel::Info, message, None);
    }

    fn log_warning(&self, message: &str) {
        self.record(LogLevel::Warning, message, None);
    }

    fn log_error(
        &self,
        message: &str,
        failure: Option<&(dyn StdError + 'static)>,
        _stack: Option<&Backtrace>,
    ) {
        self.record(
            LogLevel::Error,
            message,
            failure.map(|failure| failure.to_string()),
        );
    }
}
