//! Structured, value-equal error representation.
//!
//! Every failure that crosses a safe-execution boundary ends up as a
//! `StructuredError`: a stable machine-readable code plus a human-readable
//! message. The set of variants is open; consumers add their own by
//! implementing `ErrorVariant` on a `PartialEq` type.

use std::{
    any::Any,
    error::Error as StdError,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    sync::Arc,
};

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

/// Capability shared by every structured error variant.
///
/// Implementors must also implement `PartialEq` over *all* of their fields
/// to be wrapped in a `StructuredError`, which is what keeps equality
/// structural.
pub trait ErrorVariant: Debug + Send + Sync + 'static {
    /// Stable machine-readable identifier.
    fn code(&self) -> &str;

    /// Human-readable description.
    fn message(&self) -> &str;
}

/// Object-safe bridge adding type-aware equality to `ErrorVariant`.
trait DynVariant: ErrorVariant {
    fn as_any(&self) -> &dyn Any;

    fn dyn_eq(&self, other: &dyn DynVariant) -> bool;
}

impl<V: ErrorVariant + PartialEq> DynVariant for V {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynVariant) -> bool {
        other
            .as_any()
            .downcast_ref::<V>()
            .is_some_and(|other| self == other)
    }
}

/// Normalized, immutable failure value.
///
/// Cloning is cheap: the variant is shared behind an `Arc`. Two errors are
/// equal iff they wrap the same variant type with equal fields.
#[derive(Clone)]
pub struct StructuredError {
    inner: Arc<dyn DynVariant>,
}

impl StructuredError {
    /// Wraps any comparable variant.
    pub fn new<V: ErrorVariant + PartialEq>(variant: V) -> Self {
        Self {
            inner: Arc::new(variant),
        }
    }

    /// Creates a `GenericError` with the default `"generic-error"` code.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(GenericError::new(message))
    }

    /// Creates a `GenericError` with a caller-chosen code.
    pub fn generic_with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(GenericError::with_code(code, message))
    }

    /// Creates an `ErrorFromNative` from a rendered native failure.
    pub fn from_native(message: impl Into<String>) -> Self {
        Self::new(ErrorFromNative::new(message))
    }

    pub fn code(&self) -> &str {
        self.inner.code()
    }

    pub fn message(&self) -> &str {
        self.inner.message()
    }

    /// Returns the concrete variant if it is a `V`.
    pub fn downcast_ref<V: ErrorVariant>(&self) -> Option<&V> {
        self.inner.as_any().downcast_ref::<V>()
    }

    /// Returns `true` if the wrapped variant is a `V`.
    pub fn is<V: ErrorVariant>(&self) -> bool {
        self.downcast_ref::<V>().is_some()
    }
}

impl PartialEq for StructuredError {
    fn eq(&self, other: &Self) -> bool {
        self.inner.dyn_eq(&*other.inner)
    }
}

impl Eq for StructuredError {}

impl Debug for StructuredError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&*self.inner, f)
    }
}

impl Display for StructuredError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl StdError for StructuredError {}

impl Serialize for StructuredError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StructuredError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", self.message())?;
        state.end()
    }
}

/// Caller-declared domain failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericError {
    /// Machine-readable code, `"generic-error"` unless overridden.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl GenericError {
    /// Default code for generic failures.
    pub const CODE: &'static str = "generic-error";

    /// Creates a generic error with the default code.
    ///
    /// # Arguments
    ///
    /// * `message` - Human-readable description of the failure.
    ///
    /// # Returns
    ///
    /// A new `GenericError` with code `"generic-error"`.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_code(Self::CODE, message)
    }

    /// Creates a generic error with an explicit code.
    ///
    /// # Arguments
    ///
    /// * `code` - Stable identifier for the failure.
    /// * `message` - Human-readable description of the failure.
    ///
    /// # Returns
    ///
    /// A new `GenericError`.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl ErrorVariant for GenericError {
    fn code(&self) -> &str {
        &self.code
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Opaque wrap of a failure that no adapter recognized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorFromNative {
    /// Textual rendering of the native failure.
    pub message: String,
}

impl ErrorFromNative {
    /// Fixed code for wrapped native failures.
    pub const CODE: &'static str = "exception";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ErrorVariant for ErrorFromNative {
    fn code(&self) -> &str {
        Self::CODE
    }

    fn message(&self) -> &str {
        &self.message
    }
}

impl From<GenericError> for StructuredError {
    fn from(error: GenericError) -> Self {
        Self::new(error)
    }
}

impl From<ErrorFromNative> for StructuredError {
    fn from(error: ErrorFromNative) -> Self {
        Self::new(error)
    }
}
