//! Foundation layer - payloads and error types.

pub mod error;
pub mod payload;

pub use error::{AdaptError, AdaptResult, EventError, EventResult, OPAQUE_ERROR_MESSAGE};
pub use payload::{NativeError, Payload};
