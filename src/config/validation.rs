//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{EventHubError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_mail_config(&settings.mail)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventHubError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(EventHubError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventHubError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate SMTP mail configuration
fn validate_mail_config(config: &super::MailConfig) -> Result<()> {
    if config.smtp_host.is_empty() {
        return Err(EventHubError::Config("SMTP host is required".to_string()));
    }

    if config.from_email.is_empty() {
        return Err(EventHubError::Config(
            "Mail from address is required".to_string(),
        ));
    }

    Ok(())
}

/// Validate authentication configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.token_secret.is_empty() {
        return Err(EventHubError::Config(
            "Activation token secret is required".to_string(),
        ));
    }

    if config.activation_ttl_hours <= 0 {
        return Err(EventHubError::Config(
            "Activation TTL must be greater than 0".to_string(),
        ));
    }

    url::Url::parse(&config.frontend_url).map_err(|e| {
        EventHubError::Config(format!("Invalid frontend URL '{}': {}", config.frontend_url, e))
    })?;

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventHubError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EventHubError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.token_secret = "test-secret".to_string();
        settings
    }

    #[test]
    fn test_default_settings_need_token_secret() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_err());
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_invalid_frontend_url_rejected() {
        let mut settings = valid_settings();
        settings.auth.frontend_url = "not a url".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_connection_bounds_checked() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }
}
