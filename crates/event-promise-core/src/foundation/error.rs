//! Error types for the adapter.
//!
//! Two concerns are kept apart:
//! - [`AdaptError`] is returned synchronously by `adapt` when a request
//!   cannot be set up. No listener is attached in that case.
//! - [`EventError`] is what an adapted call rejects with once one of its
//!   error channels fires.

use serde_json::Value;
use thiserror::Error;

use crate::foundation::payload::{NativeError, Payload};

/// Message of the error produced when an error channel carries a payload that
/// is neither an error object nor a string.
pub const OPAQUE_ERROR_MESSAGE: &str = "error event emitted, payload attached as event";

// =============================================================================
// Rejection Errors
// =============================================================================

/// The normalized cause an adapted call rejects with.
///
/// Built from the payload of the error event that fired:
///
/// | payload          | variant              |
/// |------------------|----------------------|
/// | error object     | [`EventError::Native`]  (same object, not copied) |
/// | string           | [`EventError::Message`] |
/// | anything else    | [`EventError::Opaque`]  (payload kept in `event`) |
#[derive(Debug, Clone, Error)]
pub enum EventError {
    /// The source emitted an error object.
    #[error("{0}")]
    Native(NativeError),

    /// The source emitted a string on an error channel.
    #[error("{0}")]
    Message(String),

    /// The source emitted some other value on an error channel.
    #[error("{}", OPAQUE_ERROR_MESSAGE)]
    Opaque {
        /// The payload exactly as emitted.
        event: Value,
    },

    /// Every listener of the call was dropped before a terminal event fired,
    /// typically because the source itself was dropped.
    #[error("event source dropped before a terminal event was emitted")]
    Abandoned,
}

impl EventError {
    /// Returns the original payload of an [`Opaque`](Self::Opaque) rejection.
    pub fn event(&self) -> Option<&Value> {
        match self {
            Self::Opaque { event } => Some(event),
            _ => None,
        }
    }

    /// Returns the error object of a [`Native`](Self::Native) rejection.
    pub fn native(&self) -> Option<&NativeError> {
        match self {
            Self::Native(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if the call was abandoned rather than rejected by an event.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned)
    }
}

impl From<Payload> for EventError {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Error(err) => Self::Native(err),
            Payload::Value(Value::String(message)) => Self::Message(message),
            Payload::Value(event) => Self::Opaque { event },
        }
    }
}

// =============================================================================
// Setup Errors
// =============================================================================

/// Errors detected while setting up an adapted call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdaptError {
    /// No success event name was given.
    #[error("event name must not be empty")]
    EmptyEventName,

    /// Some other part of the request is malformed.
    #[error("invalid adapt configuration: {0}")]
    InvalidConfig(String),
}

impl AdaptError {
    /// Creates an invalid configuration error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type of a settled call.
pub type EventResult<T> = Result<T, EventError>;

/// Result type for setting up a call.
pub type AdaptResult<T> = Result<T, AdaptError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Error)]
    #[error("socket hang up")]
    struct HangUp;

    #[test]
    fn test_native_payload_is_passed_through() {
        let err: NativeError = Arc::new(HangUp);
        let normalized = EventError::from(Payload::from(Arc::clone(&err)));

        let native = normalized.native().expect("native variant");
        assert!(Arc::ptr_eq(native, &err));
        assert_eq!(normalized.to_string(), "socket hang up");
    }

    #[test]
    fn test_string_payload_becomes_message() {
        let normalized = EventError::from(Payload::from("boom"));
        assert!(matches!(normalized, EventError::Message(_)));
        assert_eq!(normalized.to_string(), "boom");
    }

    #[test]
    fn test_opaque_payload_is_attached() {
        let normalized = EventError::from(Payload::from(json!({"boop": true})));

        assert_eq!(normalized.to_string(), OPAQUE_ERROR_MESSAGE);
        assert_eq!(normalized.event().unwrap()["boop"], json!(true));
        assert!(normalized.native().is_none());
    }

    #[test]
    fn test_numbers_are_opaque() {
        let normalized = EventError::from(Payload::from(42));
        assert_eq!(normalized.event(), Some(&json!(42)));
    }
}
