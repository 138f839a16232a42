//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [general]
            host = "127.0.0.1"
            port = 9443
            use_ssl = true
            api_names = ["create_case", "get_case", "search_alert"]
            api_principal = "myspecialuser"
            api_password = "mysecretpassword"
            verify_certificate = false
            service_unique_id = "east"

            [timeouts]
            connect_secs = 3
            request_secs = 15

            [ingress]
            bind_address = "0.0.0.0:18080"

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.base_url(), "https://127.0.0.1:9443");
        assert_eq!(config.general.api_names.len(), 3);
        assert_eq!(config.discriminator(), Some("east"));
        assert_eq!(config.timeouts.connect_secs, 3);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = parse_config("[general]\nhost = \"h\"\n").unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Validation failed: "));
        assert!(text.contains("general.api_names"));
        assert!(text.contains("general.api_principal"));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[general\nhost = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/hive-bridge.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("hive-bridge-{}.toml", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            "[general]\nhost = \"h\"\napi_names = [\"get_alert\"]\napi_principal = \"k\"\n",
        )
        .unwrap();
        let config = load_config(&path);
        fs::remove_file(&path).ok();
        assert_eq!(config.unwrap().general.api_names, vec!["get_alert".to_string()]);
    }
}
