//! Structured error model and failure normalization.
//!
//! `StructuredError` is the closed representation every failure is turned
//! into; `Normalizer` performs that conversion and reports it through the
//! log gate.

pub mod native;
pub mod normalize;
pub mod operational;
pub mod structured;

pub use {
    native::PanicFailure,
    normalize::{ErrorAdapter, Normalizer, adapter_for, normalize},
    operational::ResultExt,
    structured::{ErrorFromNative, ErrorVariant, GenericError, StructuredError},
};
