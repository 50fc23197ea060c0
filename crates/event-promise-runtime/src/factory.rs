//! Building adapters from configuration.

use event_promise_core::{AdapterSettings, Deferred, EventAdapter};
use tracing::info;

use crate::config::{ConfigLoader, ConfigResult, EventPromiseConfig, validate_config};
use crate::logging;

/// Builds an adapter with the default deferred value implementation.
pub fn build_adapter(settings: &AdapterSettings) -> EventAdapter {
    build_adapter_with(settings)
}

/// Builds an adapter producing `D` deferred values.
pub fn build_adapter_with<D: Deferred>(settings: &AdapterSettings) -> EventAdapter<D> {
    EventAdapter::with_deferred().settings(settings.clone())
}

/// Validates `config` and builds an adapter from its `adapter` section.
pub fn from_config(config: &EventPromiseConfig) -> ConfigResult<EventAdapter> {
    validate_config(config)?;
    Ok(build_adapter(&config.adapter))
}

/// Loads configuration, initializes logging and returns a configured adapter.
///
/// ```rust,ignore
/// let adapter = event_promise_runtime::bootstrap(ConfigLoader::new())?;
/// let outcome = adapter.adapt(&socket, "close")?.await;
/// ```
pub fn bootstrap(loader: ConfigLoader) -> ConfigResult<EventAdapter> {
    let config = loader.load()?;
    validate_config(&config)?;
    logging::init_from_config(&config.logging);

    info!(
        error_event = %config.adapter.error_event,
        log_payloads = config.adapter.log_payloads,
        "Event adapter ready"
    );
    Ok(build_adapter(&config.adapter))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use event_promise_core::SharedDeferred;
    use event_promise_core::testing::TestEmitter;

    use super::*;
    use crate::config::ConfigError;

    fn failure_settings() -> AdapterSettings {
        AdapterSettings {
            error_event: "failure".to_string(),
            log_payloads: true,
        }
    }

    #[test]
    fn test_build_adapter_applies_settings() {
        let adapter = build_adapter(&failure_settings());
        assert_eq!(adapter.get_settings(), &failure_settings());

        let emitter = Arc::new(TestEmitter::new());
        let _pending = adapter.adapt(&emitter, "end").unwrap();

        assert_eq!(emitter.listener_count("end"), 1);
        assert_eq!(emitter.listener_count("failure"), 1);
        assert_eq!(emitter.listener_count("error"), 0);
    }

    #[test]
    fn test_build_adapter_with_shared() {
        let adapter = build_adapter_with::<SharedDeferred>(&AdapterSettings::default());
        let emitter = Arc::new(TestEmitter::new());

        let first = adapter.adapt(&emitter, "end").unwrap();
        let _second = first.clone();
        assert_eq!(emitter.total_listeners(), 2);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = EventPromiseConfig::default();
        config.adapter.error_event = String::new();

        let result = from_config(&config);
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));
    }

    #[test]
    fn test_from_config_defaults() {
        let adapter = from_config(&EventPromiseConfig::default()).unwrap();
        assert_eq!(adapter.get_settings().error_event, "error");
    }
}
