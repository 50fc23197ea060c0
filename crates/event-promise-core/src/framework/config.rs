//! Per-call configuration.
//!
//! An [`AdaptConfig`] describes one adaptation request: which event resolves
//! the call, and which optional behaviours (filtering, aggregation, extra
//! error channel, ignoring the reserved error channel) apply.
//!
//! ```rust,ignore
//! // Bare event name
//! adapter.adapt(&source, "end")?;
//!
//! // Collect every `data` payload until `end`, and treat `abort` as a failure
//! adapter.adapt(
//!     &source,
//!     AdaptConfig::new("end").aggregate("data").error_name("abort"),
//! )?;
//!
//! // Resolve with the first `progress` payload that reaches 100
//! adapter.adapt(
//!     &source,
//!     AdaptConfig::new("progress").filter(|p| p.as_i64() == Some(100)),
//! )?;
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{AdaptError, AdaptResult};
use crate::foundation::payload::Payload;

/// Name of the reserved error channel unless configured otherwise.
pub const DEFAULT_ERROR_EVENT: &str = "error";

/// A type-erased payload predicate.
pub type FilterFn = Arc<dyn Fn(&Payload) -> bool + Send + Sync>;

/// Configuration of one adapted call.
#[derive(Clone, Default)]
pub struct AdaptConfig {
    event_name: String,
    filter: Option<FilterFn>,
    aggregate: Option<String>,
    error_name: Option<String>,
    ignore_errors: bool,
}

impl AdaptConfig {
    /// Creates a configuration resolving on the first `event_name` occurrence.
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            ..Default::default()
        }
    }

    /// Sets the success event name.
    pub fn name(mut self, event_name: impl Into<String>) -> Self {
        self.event_name = event_name.into();
        self
    }

    /// Only resolve on a success payload for which `f` returns `true`.
    ///
    /// The success listener stays attached across non-matching occurrences.
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Payload) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(f));
        self
    }

    /// Collect every payload of `event` emitted before settlement.
    pub fn aggregate(mut self, event: impl Into<String>) -> Self {
        self.aggregate = Some(event.into());
        self
    }

    /// Reject when `event` fires, in addition to the reserved error event.
    pub fn error_name(mut self, event: impl Into<String>) -> Self {
        self.error_name = Some(event.into());
        self
    }

    /// Observe but do not reject on the reserved error event.
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn aggregate_event(&self) -> Option<&str> {
        self.aggregate.as_deref()
    }

    pub fn error_event(&self) -> Option<&str> {
        self.error_name.as_deref()
    }

    pub fn ignores_errors(&self) -> bool {
        self.ignore_errors
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    /// Returns whether `payload` qualifies as the resolving occurrence.
    pub fn accepts(&self, payload: &Payload) -> bool {
        self.filter.as_ref().is_none_or(|f| f(payload))
    }

    /// Checks the request before any listener is attached.
    pub fn validate(&self) -> AdaptResult<()> {
        if self.event_name.is_empty() {
            return Err(AdaptError::EmptyEventName);
        }
        if self.aggregate.as_deref() == Some("") {
            return Err(AdaptError::invalid("aggregate event name must not be empty"));
        }
        if self.error_name.as_deref() == Some("") {
            return Err(AdaptError::invalid("error event name must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for AdaptConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptConfig")
            .field("event_name", &self.event_name)
            .field("filter", &self.filter.is_some())
            .field("aggregate", &self.aggregate)
            .field("error_name", &self.error_name)
            .field("ignore_errors", &self.ignore_errors)
            .finish()
    }
}

impl From<&str> for AdaptConfig {
    fn from(event_name: &str) -> Self {
        Self::new(event_name)
    }
}

impl From<String> for AdaptConfig {
    fn from(event_name: String) -> Self {
        Self::new(event_name)
    }
}

impl From<&String> for AdaptConfig {
    fn from(event_name: &String) -> Self {
        Self::new(event_name.as_str())
    }
}

// =============================================================================
// Adapter Settings
// =============================================================================

/// Settings fixed when an adapter is constructed and shared by all its calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterSettings {
    /// Name of the reserved error channel.
    #[serde(default = "default_error_event")]
    pub error_event: String,

    /// Include payload contents in trace-level listener logs.
    #[serde(default)]
    pub log_payloads: bool,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            error_event: default_error_event(),
            log_payloads: false,
        }
    }
}

fn default_error_event() -> String {
    DEFAULT_ERROR_EVENT.to_string()
}
