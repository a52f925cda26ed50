//! Safe execution adapters for the three operation shapes.
//!
//! Each adapter runs an operation, funnels any failure through a
//! `Normalizer`, and packages the outcome for its shape: an `Outcome` for
//! synchronous calls, an `Err(StructuredError)` for futures, and a failure
//! item on a multicast stream for streams.

pub mod future;
pub mod multicast;
pub mod stream;
pub mod sync;

pub use {
    future::{run_safe_async, run_safe_async_nullable},
    multicast::{Multicast, Subscription},
    stream::{NullableStream, SafeStream, run_safe_stream, run_safe_stream_nullable},
    sync::run_safe_sync,
};
