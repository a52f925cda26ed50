//! Level-filtered gate in front of a pluggable logger.
//!
//! The gate owns two cells: the active logger and the minimum severity.
//! Every diagnostic emitted by this crate goes through a `LogGate`, either
//! one injected into a `Normalizer` or the process-wide instance returned by
//! `LogGate::global()`.

use std::{
    backtrace::Backtrace,
    error::Error as StdError,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str::FromStr,
    sync::{Arc, LazyLock},
};

use {
    parking_lot::RwLock,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

/// Process-wide gate, created with no logger and the `Error` threshold.
static GLOBAL_GATE: LazyLock<Arc<LogGate>> = LazyLock::new(|| Arc::new(LogGate::new()));

/// Severity, ordered for filtering purposes.
///
/// `None` as a threshold suppresses everything; `Error` as a threshold only
/// lets error-level messages through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Suppresses all output.
    None,
    /// Verbose tracing output.
    Debug,
    /// Informational output.
    Info,
    /// Recoverable problems.
    #[serde(alias = "warn")]
    Warning,
    /// Failures (default threshold).
    #[default]
    Error,
}

impl LogLevel {
    /// Returns `true` if a message of `severity` clears this threshold.
    #[must_use]
    pub fn allows(self, severity: LogLevel) -> bool {
        self != LogLevel::None && severity >= self
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::None => "none",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a log level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown log level: {value}")]
pub struct LevelParseError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for LogLevel {
    type Err = LevelParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(LogLevel::None),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(LevelParseError {
                value: value.to_string(),
            }),
        }
    }
}

/// Logging capability set supplied by the caller.
///
/// The gate calls these after filtering; implementations never need to
/// re-check the level.
pub trait Logger: Send + Sync {
    fn log_debug(&self, message: &str);

    fn log_info(&self, message: &str);

    fn log_warning(&self, message: &str);

    /// Receives error-level messages along with the raw failure and a
    /// backtrace captured at normalization time, when available.
    fn log_error(
        &self,
        message: &str,
        failure: Option<&(dyn StdError + 'static)>,
        stack: Option<&Backtrace>,
    );
}

/// Level-filtered logging configuration and emission path.
#[derive(Default)]
pub struct LogGate {
    /// Currently installed logger, if any.
    logger: RwLock<Option<Arc<dyn Logger>>>,
    /// Global severity threshold.
    minimum_level: RwLock<LogLevel>,
}

impl Debug for LogGate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("LogGate")
            .field("has_logger", &self.has_logger())
            .field("minimum_level", &self.minimum_level())
            .finish()
    }
}

impl LogGate {
    /// Creates a gate with no logger and the `Error` threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide gate.
    ///
    /// Configure it once at startup; readers may call this from anywhere.
    #[must_use]
    pub fn global() -> Arc<LogGate> {
        Arc::clone(&GLOBAL_GATE)
    }

    /// Installs `logger`, replacing any previous one.
    pub fn set_logger(&self, logger: Arc<dyn Logger>) {
        *self.logger.write() = Some(logger);
    }

    /// Removes the active logger; subsequent messages are dropped.
    pub fn clear_logger(&self) {
        *self.logger.write() = None;
    }

    #[must_use]
    pub fn has_logger(&self) -> bool {
        self.logger.read().is_some()
    }

    pub fn set_minimum_level(&self, level: LogLevel) {
        *self.minimum_level.write() = level;
    }

    #[must_use]
    pub fn minimum_level(&self) -> LogLevel {
        *self.minimum_level.read()
    }

    /// Decides whether a message of `severity` should be forwarded.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity of the message.
    /// * `level_override` - Optional per-call threshold, OR'd with the global one.
    ///
    /// # Returns
    ///
    /// `true` if the message clears the global threshold or the override.
    #[must_use]
    pub fn passes(&self, severity: LogLevel, level_override: Option<LogLevel>) -> bool {
        self.minimum_level().allows(severity)
            || level_override.is_some_and(|level| level.allows(severity))
    }

    fn logger_for(
        &self,
        severity: LogLevel,
        level_override: Option<LogLevel>,
    ) -> Option<Arc<dyn Logger>> {
        if !self.passes(severity, level_override) {
            return None;
        }
        self.logger.read().clone()
    }

    pub fn log_debug(&self, message: &str, level_override: Option<LogLevel>) {
        if let Some(logger) = self.logger_for(LogLevel::Debug, level_override) {
            logger.log_debug(message);
        }
    }

    pub fn log_info(&self, message: &str, level_override: Option<LogLevel>) {
        if let Some(logger) = self.logger_for(LogLevel::Info, level_override) {
            logger.log_info(message);
        }
    }

    pub fn log_warning(&self, message: &str, level_override: Option<LogLevel>) {
        if let Some(logger) = self.logger_for(LogLevel::Warning, level_override) {
            logger.log_warning(message);
        }
    }

    pub fn log_error(
        &self,
        message: &str,
        failure: Option<&(dyn StdError + 'static)>,
        stack: Option<&Backtrace>,
        level_override: Option<LogLevel>,
    ) {
        if let Some(logger) = self.logger_for(LogLevel::Error, level_override) {
            logger.log_error(message, failure, stack);
        }
    }
}

/// Installs `logger` on the process-wide gate.
pub fn set_logger(logger: Arc<dyn Logger>) {
    GLOBAL_GATE.set_logger(logger);
}

/// Removes the logger from the process-wide gate.
pub fn clear_logger() {
    GLOBAL_GATE.clear_logger();
}

/// Sets the process-wide minimum level.
pub fn set_log_level(level: LogLevel) {
    GLOBAL_GATE.set_minimum_level(level);
}

/// Reads the process-wide minimum level.
#[must_use]
pub fn log_level() -> LogLevel {
    GLOBAL_GATE.minimum_level()
}

pub fn log_debug(message: &str, level_override: Option<LogLevel>) {
    GLOBAL_GATE.log_debug(message, level_override);
}

pub fn log_info(message: &str, level_override: Option<LogLevel>) {
    GLOBAL_GATE.log_info(message, level_override);
}

pub fn log_warning(message: &str, level_override: Option<LogLevel>) {
    GLOBAL_GATE.log_warning(message, level_override);
}

pub fn log_error(
    message: &str,
    failure: Option<&(dyn StdError + 'static)>,
    stack: Option<&Backtrace>,
    level_override: Option<LogLevel>,
) {
    GLOBAL_GATE.log_error(message, failure, stack, level_override);
}
