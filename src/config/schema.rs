//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a
//! bootstrapped application. All types derive Serde traits for
//! deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for a bootstrapped application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Logging declarations layered over the runtime logger defaults.
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Logging declarations from the configuration source.
///
/// Both fields are optional; absent values leave the runtime logger
/// defaults in place.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum severity, overriding the runtime default of `info`.
    /// Accepts full filter directives (e.g., "debug" or "myapp=trace,warn").
    pub level: Option<String>,

    /// Optional file sink; records are appended as one JSON object per line.
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.logging.level.is_none());
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_logging_declarations_parse() {
        let config: AppConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9090"

            [logging]
            level = "debug"
            file = "/var/log/app.jsonl"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9090");
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert!(config.logging.file.is_some());
    }
}
