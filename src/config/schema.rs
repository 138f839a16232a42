//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bridge service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upstream server, credentials and enabled operations.
    pub general: GeneralConfig,

    /// Upstream transport timeouts.
    pub timeouts: TimeoutConfig,

    /// Fabric request settings.
    pub fabric: FabricConfig,

    /// HTTP ingress onto the fabric.
    pub ingress: IngressConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServiceConfig {
    /// Topic discriminator, if one is configured.
    pub fn discriminator(&self) -> Option<&str> {
        self.general
            .service_unique_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Upstream server and service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Upstream host name or address (required).
    pub host: String,

    /// Upstream port. Defaults to 443 with SSL, 80 without.
    pub port: Option<u16>,

    /// Use HTTPS for upstream requests.
    pub use_ssl: bool,

    /// Operation names to expose on the fabric (required).
    pub api_names: Vec<String>,

    /// API key, or user name when `api_password` is set (required).
    pub api_principal: String,

    /// Password for Basic authentication.
    pub api_password: String,

    /// Verify the upstream server certificate.
    pub verify_certificate: bool,

    /// PEM trust bundle used instead of the system store.
    pub verify_cert_bundle: Option<String>,

    /// Per-deployment topic discriminator.
    pub service_unique_id: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: None,
            use_ssl: true,
            api_names: Vec::new(),
            api_principal: String::new(),
            api_password: String::new(),
            verify_certificate: true,
            verify_cert_bundle: None,
            service_unique_id: None,
        }
    }
}

impl GeneralConfig {
    pub fn scheme(&self) -> &'static str {
        if self.use_ssl {
            "https"
        } else {
            "http"
        }
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.use_ssl { 443 } else { 80 })
    }

    /// e.g. `https://thehive.example.com:443`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host.trim(), self.effective_port())
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time for one upstream request/response in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
        }
    }
}

/// Fabric request settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FabricConfig {
    /// How long a requester waits for a reply, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

/// HTTP ingress configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngressConfig {
    /// Serve the HTTP ingress.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
