//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check required upstream settings (host, operations, principal)
//! - Validate value ranges (timeouts > 0, ports valid, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Unknown operation names are not errors; registration skips them

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required setting is absent or empty.
    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    /// A setting has an unusable value.
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Check `config` and report every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let general = &config.general;

    if general.host.trim().is_empty() {
        errors.push(ValidationError::Missing("general.host"));
    }
    if general.api_names.iter().all(|name| name.trim().is_empty()) {
        errors.push(ValidationError::Missing("general.api_names"));
    }
    if general.api_principal.is_empty() {
        errors.push(ValidationError::Missing("general.api_principal"));
    }
    if general.port == Some(0) {
        errors.push(invalid("general.port", "must be between 1 and 65535"));
    }
    if general.verify_certificate {
        if let Some(bundle) = general.verify_cert_bundle.as_deref().filter(|b| !b.is_empty()) {
            if !Path::new(bundle).is_file() {
                errors.push(invalid("general.verify_cert_bundle", format!("file not found: {}", bundle)));
            }
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(invalid("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(invalid("timeouts.request_secs", "must be greater than 0"));
    }
    if config.fabric.request_timeout_secs == 0 {
        errors.push(invalid("fabric.request_timeout_secs", "must be greater than 0"));
    }

    if config.ingress.enabled {
        if let Err(e) = config.ingress.bind_address.parse::<SocketAddr>() {
            errors.push(invalid("ingress.bind_address", e.to_string()));
        }
        if config.ingress.max_body_bytes == 0 {
            errors.push(invalid("ingress.max_body_bytes", "must be greater than 0"));
        }
    }
    if config.observability.metrics_enabled {
        if let Err(e) = config.observability.metrics_address.parse::<SocketAddr>() {
            errors.push(invalid("observability.metrics_address", e.to_string()));
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

    fn valid_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.general.host = "thehive.local".into();
        config.general.api_names = vec!["create_case".into()];
        config.general.api_principal = "key".into();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_reports_all_missing_fields() {
        let errors = validate_config(&ServiceConfig::default()).unwrap_err();
        assert!(errors.contains(&ValidationError::Missing("general.host")));
        assert!(errors.contains(&ValidationError::Missing("general.api_names")));
        assert!(errors.contains(&ValidationError::Missing("general.api_principal")));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = valid_config();
        config.general.port = Some(0);
        config.timeouts.request_secs = 0;
        config.ingress.bind_address = "nowhere".into();
        config.general.verify_cert_bundle = Some("/nonexistent/ca.pem".into());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::Invalid { field, .. } => Some(*field),
                ValidationError::Missing(_) => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "general.port",
                "general.verify_cert_bundle",
                "timeouts.request_secs",
                "ingress.bind_address"
            ]
        );
    }

    #[test]
    fn test_bundle_ignored_without_verification() {
        let mut config = valid_config();
        config.general.verify_certificate = false;
        config.general.verify_cert_bundle = Some("/nonexistent/ca.pem".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_disabled_ingress_not_checked() {
        let mut config = valid_config();
        config.ingress.enabled = false;
        config.ingress.bind_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
