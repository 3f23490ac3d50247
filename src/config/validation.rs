//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value formats (bind address, filter directives)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::AppConfig;

/// A single semantic validation failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Bind address does not parse as a socket address.
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    /// Logging level is not a valid filter directive set.
    #[error("invalid logging level '{0}'")]
    InvalidLogLevel(String),

    /// Log file path is empty.
    #[error("log file path is empty")]
    EmptyLogFilePath,
}

/// Validate an [`AppConfig`], collecting every failure.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Some(level) = &config.logging.level {
        if EnvFilter::try_new(level).is_err() {
            errors.push(ValidationError::InvalidLogLevel(level.clone()));
        }
    }

    if let Some(file) = &config.logging.file {
        if file.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyLogFilePath);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_collected() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.logging.level = Some("not a directive!!!".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
