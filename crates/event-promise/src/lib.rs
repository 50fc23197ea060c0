//! # Event Promise
//!
//! Await the next terminal event of an emitter instead of wiring listener
//! callbacks by hand.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────┐  on/once   ┌──────────────┐  complete  ┌──────────┐
//! │ Emitter │◀───────────│ EventAdapter │───────────▶│ Deferred │──▶ .await
//! │         │──payload──▶│  (per call)  │            └──────────┘
//! └─────────┘            └──────────────┘
//! ```
//!
//! - **Emitter**: any source implementing the [`Emitter`](core::Emitter) contract
//! - **EventAdapter**: attaches listeners for one call and settles it once
//! - **Deferred**: the awaitable outcome, a [`Resolution`](core::Resolution)
//!   or an [`EventError`](core::EventError)
//!
//! Whichever of the success event, the reserved `error` event, or the
//! configured custom error event fires first decides the outcome. Every
//! listener the call attached is removed before the outcome is observable.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use event_promise::prelude::*;
//!
//! let adapter = bootstrap(ConfigLoader::new())?;
//!
//! // Resolve with the first `end` payload, collecting `data` until then
//! let body = adapter
//!     .adapt(&stream, AdaptConfig::new("end").aggregate("data"))?
//!     .await?;
//! println!("{} chunks", body.aggregated().map_or(0, <[_]>::len));
//!
//! // Resolve with the first `progress` payload above 50
//! let half = adapter
//!     .adapt(&job, AdaptConfig::new("progress").filter(|p| p.as_i64() > Some(50)))?
//!     .await?;
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `event-promise.toml` files (default)
//! - `yaml-config`: load `event-promise.yaml` files
//! - `json-log`: JSON log output
//! - `test-util`: the in-memory `TestEmitter`

pub use event_promise_core as core;
pub use event_promise_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use event_promise::prelude::*;
/// ```
pub mod prelude {
    // Adapter and per-call configuration
    pub use event_promise_core::{AdaptConfig, AdapterSettings, EventAdapter};

    // Deferred values
    pub use event_promise_core::{
        AdaptOutcome, Deferred, OneshotDeferred, Resolution, SharedDeferred,
    };

    // Emitter contract and payloads
    pub use event_promise_core::{Emitter, Listener, ListenerId, Payload};

    // Errors
    pub use event_promise_core::{AdaptError, AdaptResult, EventError, EventResult};

    // Configuration and setup
    pub use event_promise_runtime::{
        ConfigError, ConfigLoader, EventPromiseConfig, bootstrap, build_adapter,
    };

    // Logging macros
    pub use event_promise_runtime::prelude::*;
}
