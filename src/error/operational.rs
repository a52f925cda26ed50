//! Extension trait bringing normalization to plain `Result` values.

use anyhow::Error;

use crate::{
    error::{normalize::Normalizer, structured::StructuredError},
    outcome::Outcome,
};

/// Normalizes the error side of an ordinary `Result`.
///
/// Already-structured errors are passed through without a second report.
pub trait ResultExt<T> {
    /// Normalizes the error through the process-wide gate.
    fn structured(self) -> Result<T, StructuredError>;

    /// Normalizes the error through `normalizer`.
    fn structured_with(self, normalizer: &Normalizer) -> Result<T, StructuredError>;

    /// Converts into an `Outcome`, normalizing the error.
    fn into_outcome(self) -> Outcome<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for Result<T, E> {
    fn structured(self) -> Result<T, StructuredError> {
        self.structured_with(&Normalizer::default())
    }

    fn structured_with(self, normalizer: &Normalizer) -> Result<T, StructuredError> {
        self.map_err(|failure| normalizer.structure(failure))
    }

    fn into_outcome(self) -> Outcome<T> {
        self.structured().into()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Error as IoError, ErrorKind::TimedOut},
        sync::Arc,
    };

    use crate::{
        error::{Normalizer, StructuredError, operational::ResultExt},
        log::{LogGate, testing::RecordingLogger},
    };

    #[test]
    fn test_structured_with_wraps_native_error() {
        let gate = Arc::new(LogGate::new());
        let recorder = Arc::new(RecordingLogger::default());
        gate.set_logger(recorder.clone());
        let normalizer = Normalizer::new(gate);

        let result: Result<u8, IoError> = Err(IoError::new(TimedOut, "Timed out"));
        let error = result.structured_with(&normalizer).unwrap_err();

        assert_eq!(error.code(), "exception");
        assert_eq!(error.message(), "Timed out");
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_structured_keeps_structured_error() {
        let error = StructuredError::generic_with_code("conflict", "Version mismatch");
        let result: Result<(), StructuredError> = Err(error.clone());
        assert_eq!(result.structured(), Err(error));
    }

    #[test]
    fn test_into_outcome_success() {
        let result: Result<&str, IoError> = Ok("fine");
        assert_eq!(result.into_outcome().into_value(), Some("fine"));
    }
}
