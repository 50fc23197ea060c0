//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{EventPromiseConfig, LogOutput, LoggingConfig};
use event_promise_core::AdapterSettings;

/// Validates the entire configuration.
pub fn validate_config(config: &EventPromiseConfig) -> ConfigResult<()> {
    validate_adapter_settings(&config.adapter)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates adapter settings.
fn validate_adapter_settings(settings: &AdapterSettings) -> ConfigResult<()> {
    if settings.error_event.is_empty() {
        return Err(ConfigError::missing_field("adapter.error_event"));
    }

    if settings.error_event.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "Reserved error event cannot contain whitespace: {:?}",
            settings.error_event
        )));
    }

    Ok(())
}

/// Validates logging configuration.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.filters.keys().any(|module| module.trim().is_empty()) {
        return Err(ConfigError::validation("Log filter module cannot be empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = EventPromiseConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_error_event() {
        let mut config = EventPromiseConfig::default();
        config.adapter.error_event = String::new();

        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));
    }

    #[test]
    fn test_validate_whitespace_error_event() {
        let mut config = EventPromiseConfig::default();
        config.adapter.error_event = "on error".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_requires_path() {
        let mut config = EventPromiseConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("logs/event-promise.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
