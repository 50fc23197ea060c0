//! Event Promise Runtime - configuration and logging for event adapters.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`) and validation
//! - Logging initialization on top of `tracing-subscriber`
//! - Adapter construction from settings (`build_adapter`, `bootstrap`)
//!
//! # Example
//!
//! ```ignore
//! use event_promise_runtime::{ConfigLoader, bootstrap};
//!
//! // Reads event-promise.toml and EVENT_PROMISE_* variables, installs
//! // the subscriber, and returns an adapter using the configured settings.
//! let adapter = bootstrap(ConfigLoader::new())?;
//!
//! let body = adapter.adapt(&response, "end")?.await?;
//! ```

pub mod config;
pub mod factory;
pub mod logging;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, EventPromiseConfig, LoggingConfig, Profile,
    validate_config,
};
pub use factory::{bootstrap, build_adapter, build_adapter_with, from_config};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
