//! # Event Promise Core
//!
//! Turns the next terminal event of an emitter into a single awaitable
//! outcome.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Payloads**: what events carry ([`Payload`])
//! - **Errors**: normalized rejection causes ([`EventError`]) and setup
//!   errors ([`AdaptError`])
//!
//! ### Framework Layer
//!
//! - **Adapter**: attaches listeners and hands out deferred values ([`EventAdapter`])
//! - **Per-call configuration**: filter, aggregation, error channels ([`AdaptConfig`])
//! - **Deferred values**: pluggable single-assignment futures ([`Deferred`])
//! - **Ledger**: listener bookkeeping and settlement state ([`SubscriptionLedger`])
//!
//! ### Integration Layer
//!
//! - **Emitter contract**: what a source must support ([`Emitter`])
//!
//! ## Settlement
//!
//! ```text
//! adapt() ──▶ Pending ──first terminal event──▶ Settling ──teardown──▶ Settled
//!                │                                                       │
//!                └── filtered / ignored events keep it Pending           └──▶ deferred value
//! ```
//!
//! Exactly one trigger wins. All listeners the call attached are removed
//! before the outcome becomes observable.
//!
//! ## Example
//!
//! ```rust,ignore
//! use event_promise_core::{AdaptConfig, EventAdapter, EventError};
//!
//! let adapter = EventAdapter::new();
//!
//! // Resolve with the payload of the first `end` event
//! let value = adapter.adapt(&download, "end")?.await?.into_value();
//!
//! // Reject on `abort` as well as on `error`
//! match adapter.adapt(&upload, AdaptConfig::new("finish").error_name("abort"))?.await {
//!     Ok(resolution) => println!("uploaded: {:?}", resolution.value()),
//!     Err(EventError::Opaque { event }) => println!("aborted with {event}"),
//!     Err(err) => println!("failed: {err}"),
//! }
//! ```

// Architectural layers
pub mod foundation;
pub mod framework;
pub mod integration;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export foundation types
pub use foundation::{
    AdaptError, AdaptResult, EventError, EventResult, NativeError, OPAQUE_ERROR_MESSAGE, Payload,
};

// Re-export framework types
pub use framework::{
    AdaptConfig, AdaptOutcome, AdapterSettings, CallState, Completer, DEFAULT_ERROR_EVENT,
    Deferred, EventAdapter, FilterFn, OneshotCompleter, OneshotDeferred, Resolution,
    SharedDeferred, Subscription, SubscriptionLedger,
};

// Re-export integration types
pub use integration::{Emitter, Listener, ListenerId};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::framework::{AdaptConfig, Deferred, EventAdapter, Resolution};
    pub use super::integration::{Emitter, Listener, ListenerId};
}
