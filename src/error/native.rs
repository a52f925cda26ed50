//! Native failures raised by unwinding panics.

use std::any::Any;

use thiserror::Error;

/// A caught panic, carried as an ordinary error value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("panicked: {message}")]
pub struct PanicFailure {
    /// The panic payload rendered as text.
    pub message: String,
}

impl PanicFailure {
    /// Converts a payload returned by `catch_unwind` into a failure.
    ///
    /// # Arguments
    ///
    /// * `payload` - The boxed panic payload.
    ///
    /// # Returns
    ///
    /// A `PanicFailure` whose message is the payload if it was a string,
    /// or a placeholder otherwise.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "non-string panic payload".to_string(),
            },
        };
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        any::Any,
        panic::{UnwindSafe, catch_unwind, panic_any},
    };

    use crate::error::native::PanicFailure;

    fn payload_of(operation: impl FnOnce() + UnwindSafe) -> Box<dyn Any + Send> {
        catch_unwind(operation).unwrap_err()
    }

    #[test]
    fn test_static_str_payload() {
        let payload = payload_of(|| panic!("static message"));
        let failure = PanicFailure::from_payload(payload);
        assert_eq!(failure.message, "static message");
        assert_eq!(failure.to_string(), "panicked: static message");
    }

    #[test]
    fn test_formatted_payload() {
        let code = 7;
        let payload = payload_of(move || panic!("code {code}"));
        assert_eq!(PanicFailure::from_payload(payload).message, "code 7");
    }

    #[test]
    fn test_opaque_payload() {
        let payload = payload_of(|| panic_any(42_u8));
        assert_eq!(
            PanicFailure::from_payload(payload).message,
            "non-string panic payload"
        );
    }
}
