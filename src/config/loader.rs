//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the schema.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantic validation failed; all failures are listed.
    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("app-bootstrap-{}-{}", std::process::id(), name));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/app.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let path = temp_file("malformed.toml", "listener = [broken");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_invalid_values_are_validation_errors() {
        let path = temp_file(
            "invalid.toml",
            "[listener]\nbind_address = \"nope\"\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_valid_file_loads() {
        let path = temp_file(
            "valid.toml",
            "[listener]\nbind_address = \"127.0.0.1:0\"\n[logging]\nlevel = \"debug\"\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:0");
        let _ = fs::remove_file(path);
    }
}
