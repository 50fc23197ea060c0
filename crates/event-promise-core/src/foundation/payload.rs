//! Event payloads.
//!
//! Emitters deliver arbitrary data. [`Payload`] models that as either a JSON
//! value or a native error object, which is exactly the distinction the
//! rejection path needs when it normalizes error causes.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A shared, type-erased error object carried by an event.
pub type NativeError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// The data carried by one event occurrence.
///
/// Cloning is cheap: JSON values are cloned, error objects are shared.
#[derive(Clone)]
pub enum Payload {
    /// Plain data (numbers, strings, objects, arrays, null).
    Value(Value),
    /// A native error object.
    Error(NativeError),
}

impl Payload {
    /// Wraps an error object.
    pub fn error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Error(Arc::new(err))
    }

    /// Returns the JSON value, if this is plain data.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Returns the string content, if this is a JSON string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Returns the integer content, if this is a JSON integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    /// Returns the error object, if this payload carries one.
    pub fn as_error(&self) -> Option<&NativeError> {
        match self {
            Self::Error(err) => Some(err),
            Self::Value(_) => None,
        }
    }

    /// Returns `true` if this payload carries an error object.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Short description of the payload shape, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Error(_) => "error",
            Self::Value(Value::Null) => "null",
            Self::Value(Value::Bool(_)) => "bool",
            Self::Value(Value::Number(_)) => "number",
            Self::Value(Value::String(_)) => "string",
            Self::Value(Value::Array(_)) => "array",
            Self::Value(Value::Object(_)) => "object",
        }
    }

    /// Consumes the payload, returning the JSON value if it is plain data.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Error(_) => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Error(err) => f.debug_tuple("Error").field(&err.to_string()).finish(),
        }
    }
}

/// Values compare by content; error objects compare by identity.
impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<NativeError> for Payload {
    fn from(err: NativeError) -> Self {
        Self::Error(err)
    }
}

macro_rules! payload_from_json {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Payload {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

payload_from_json!(&str, String, bool, i32, i64, u32, u64, f64);
