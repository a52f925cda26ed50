//! Conversion of arbitrary failures into `StructuredError`.
//!
//! Raw failures travel as `anyhow::Error`, so anything implementing
//! `std::error::Error` (including `StructuredError` itself) can be handed to
//! the normalizer and recovered by downcast.

use std::{
    backtrace::{Backtrace, BacktraceStatus},
    error::Error as StdError,
    fmt::{Debug, Formatter, Result as FmtResult},
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use anyhow::Error;

use crate::{
    error::{
        native::PanicFailure,
        structured::{ErrorFromNative, StructuredError},
    },
    log::{LogGate, LogLevel},
};

/// Caller-supplied translation applied before the default wrapping.
///
/// Return a `StructuredError` (converted into `anyhow::Error`) to claim the
/// failure, or any other error to hand it on to the default wrapping.
pub type ErrorAdapter = Arc<dyn Fn(Error) -> Error + Send + Sync>;

/// Builds an adapter that recognizes one concrete error type.
///
/// Failures that do not downcast to `E` pass through untouched.
///
/// # Arguments
///
/// * `convert` - Maps a recognized `E` into a `StructuredError`.
///
/// # Returns
///
/// An `ErrorAdapter` suitable for `Normalizer::with_adapter`.
pub fn adapter_for<E, F>(convert: F) -> ErrorAdapter
where
    E: StdError + Send + Sync + 'static,
    F: Fn(&E) -> StructuredError + Send + Sync + 'static,
{
    Arc::new(move |failure: Error| match failure.downcast_ref::<E>() {
        Some(native) => convert(native).into(),
        None => failure,
    })
}

/// Normalizes failures and reports them through a `LogGate`.
///
/// A `Normalizer` also carries the per-call overrides (adapter and log
/// level) used by the safe-execution adapters.
#[derive(Clone)]
pub struct Normalizer {
    /// Gate receiving the error-level report of each normalization.
    gate: Arc<LogGate>,
    /// Optional translation tried before the default wrapping.
    adapter: Option<ErrorAdapter>,
    /// Optional per-call threshold OR'd with the gate's own.
    level_override: Option<LogLevel>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(LogGate::global())
    }
}

impl Debug for Normalizer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Normalizer")
            .field("gate", &self.gate)
            .field("has_adapter", &self.adapter.is_some())
            .field("level_override", &self.level_override)
            .finish()
    }
}

impl Normalizer {
    /// Creates a normalizer reporting to `gate`, with no overrides.
    #[must_use]
    pub fn new(gate: Arc<LogGate>) -> Self {
        Self {
            gate,
            adapter: None,
            level_override: None,
        }
    }

    #[must_use]
    pub fn with_adapter(mut self, adapter: ErrorAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }

    #[must_use]
    pub fn with_level_override(mut self, level: LogLevel) -> Self {
        self.level_override = Some(level);
        self
    }

    #[must_use]
    pub fn gate(&self) -> &LogGate {
        &self.gate
    }

    #[must_use]
    pub fn level_override(&self) -> Option<LogLevel> {
        self.level_override
    }

    /// Converts `failure` into a `StructuredError`.
    ///
    /// Reports the raw failure once at error severity, then returns it
    /// unchanged if it already is structured, else the adapter's answer if
    /// that is structured, else an `ErrorFromNative` wrap.
    ///
    /// # Arguments
    ///
    /// * `failure` - Any failure convertible into `anyhow::Error`.
    ///
    /// # Returns
    ///
    /// The normalized error. This never fails.
    pub fn normalize(&self, failure: impl Into<Error>) -> StructuredError {
        let failure = failure.into();
        self.report(&failure);

        let failure = match failure.downcast::<StructuredError>() {
            Ok(structured) => return structured,
            Err(failure) => failure,
        };

        let failure = match &self.adapter {
            Some(adapter) => match self.adapt(adapter, failure) {
                Ok(structured) => return structured,
                Err(failure) => failure,
            },
            None => failure,
        };

        wrap_native(&failure)
    }

    /// Like `normalize`, but passes already-structured failures through
    /// without reporting them again.
    pub fn structure(&self, failure: impl Into<Error>) -> StructuredError {
        match failure.into().downcast::<StructuredError>() {
            Ok(structured) => structured,
            Err(failure) => self.normalize(failure),
        }
    }

    fn report(&self, failure: &Error) {
        let stack = Backtrace::capture();
        let stack = (stack.status() == BacktraceStatus::Captured).then_some(&stack);
        let native: &(dyn StdError + 'static) = &**failure;
        self.gate.log_error(
            &format!("{failure:#}"),
            Some(native),
            stack,
            self.level_override,
        );
    }

    fn adapt(&self, adapter: &ErrorAdapter, failure: Error) -> Result<StructuredError, Error> {
        match catch_unwind(AssertUnwindSafe(|| adapter(failure))) {
            Ok(adapted) => adapted.downcast::<StructuredError>(),
            Err(payload) => {
                let panic = PanicFailure::from_payload(payload);
                self.gate.log_warning(
                    &format!("error adapter {panic}, using default wrapping"),
                    self.level_override,
                );
                Ok(ErrorFromNative::new(format!("error adapter {panic}")).into())
            }
        }
    }
}

fn wrap_native(failure: &Error) -> StructuredError {
    ErrorFromNative::new(format!("{failure:#}")).into()
}

/// Normalizes `failure` through the process-wide gate.
///
/// # Arguments
///
/// * `failure` - Any failure convertible into `anyhow::Error`.
/// * `adapter` - Optional translation tried before the default wrapping.
pub fn normalize(failure: impl Into<Error>, adapter: Option<ErrorAdapter>) -> StructuredError {
    let normalizer = Normalizer::default();
    match adapter {
        Some(adapter) => normalizer.with_adapter(adapter).normalize(failure),
        None => normalizer.normalize(failure),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Error as IoError, ErrorKind},
        sync::Arc,
    };

    use anyhow::{Context, Error, anyhow};

    use crate::{
        error::{
            normalize::{ErrorAdapter, Normalizer, adapter_for},
            structured::{ErrorFromNative, GenericError, StructuredError},
        },
        log::{LogGate, LogLevel, testing::RecordingLogger},
    };

    fn recorded_normalizer() -> (Normalizer, Arc<RecordingLogger>) {
        let gate = Arc::new(LogGate::new());
        let recorder = Arc::new(RecordingLogger::default());
        gate.set_logger(recorder.clone());
        (Normalizer::new(gate), recorder)
    }

    fn io_adapter() -> ErrorAdapter {
        adapter_for(|error: &IoError| {
            StructuredError::generic_with_code("io", error.to_string())
        })
    }

    #[test]
    fn test_default_wrap_renders_failure() {
        let (normalizer, recorder) = recorded_normalizer();
        let error = normalizer.normalize(anyhow!("connection reset"));

        assert_eq!(error.code(), ErrorFromNative::CODE);
        assert_eq!(error.message(), "connection reset");
        assert_eq!(recorder.count_at(LogLevel::Error), 1);
    }

    #[test]
    fn test_default_wrap_includes_context_chain() {
        let (normalizer, _) = recorded_normalizer();
        let failure = Err::<(), _>(IoError::new(ErrorKind::NotFound, "missing"))
            .context("loading profile")
            .unwrap_err();

        let error = normalizer.normalize(failure);
        assert_eq!(error.message(), "loading profile: missing");
    }

    #[test]
    fn test_structured_failure_is_returned_unchanged() {
        let (normalizer, recorder) = recorded_normalizer();
        let original = StructuredError::generic_with_code("quota", "Over quota");

        let error = normalizer.normalize(original.clone());
        assert_eq!(error, original);
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let (normalizer, _) = recorded_normalizer();
        let once = normalizer.normalize(anyhow!("flaky"));
        let twice = normalizer.normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_adapter_result_takes_precedence() {
        let (normalizer, recorder) = recorded_normalizer();
        let normalizer = normalizer.with_adapter(io_adapter());

        let error = normalizer.normalize(IoError::new(ErrorKind::PermissionDenied, "denied"));
        assert_eq!(error, StructuredError::generic_with_code("io", "denied"));
        assert_eq!(recorder.count_at(LogLevel::Error), 1);
    }

    #[test]
    fn test_unrecognized_failure_falls_through_adapter() {
        let (normalizer, _) = recorded_normalizer();
        let normalizer = normalizer.with_adapter(io_adapter());

        let error = normalizer.normalize(anyhow!("not an io error"));
        assert!(error.is::<ErrorFromNative>());
        assert_eq!(error.message(), "not an io error");
    }

    #[test]
    fn test_adapter_may_substitute_raw_failure() {
        let (normalizer, _) = recorded_normalizer();
        let adapter: ErrorAdapter =
            Arc::new(|failure: Error| anyhow!("translated: {failure}"));
        let error = normalizer.with_adapter(adapter).normalize(anyhow!("raw"));

        assert!(error.is::<ErrorFromNative>());
        assert_eq!(error.message(), "translated: raw");
    }

    #[test]
    fn test_panicking_adapter_is_default_wrapped() {
        let (normalizer, recorder) = recorded_normalizer();
        let adapter: ErrorAdapter = Arc::new(|_: Error| -> Error { panic!("adapter bug") });
        let normalizer = normalizer
            .with_adapter(adapter)
            .with_level_override(LogLevel::Warning);

        let error = normalizer.normalize(anyhow!("original"));
        assert!(error.is::<ErrorFromNative>());
        assert_eq!(error.message(), "error adapter panicked: adapter bug");
        assert_eq!(recorder.count_at(LogLevel::Error), 1);
        assert_eq!(recorder.count_at(LogLevel::Warning), 1);
    }

    #[test]
    fn test_structure_skips_report_for_structured() {
        let (normalizer, recorder) = recorded_normalizer();

        let structured = normalizer.structure(StructuredError::new(GenericError::new("known")));
        assert_eq!(structured, StructuredError::generic("known"));
        assert_eq!(recorder.count(), 0);

        normalizer.structure(anyhow!("unknown"));
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_report_carries_raw_failure() {
        let (normalizer, recorder) = recorded_normalizer();
        normalizer.normalize(anyhow!("raw detail"));

        let entries = recorder.entries();
        assert_eq!(entries[0].message, "raw detail");
        assert_eq!(entries[0].failure.as_deref(), Some("raw detail"));
    }

    #[test]
    fn test_filtered_gate_still_normalizes() {
        let (normalizer, recorder) = recorded_normalizer();
        normalizer.gate().set_minimum_level(LogLevel::None);

        let error = normalizer.normalize(anyhow!("silent"));
        assert_eq!(error.message(), "silent");
        assert_eq!(recorder.count(), 0);
    }
}
