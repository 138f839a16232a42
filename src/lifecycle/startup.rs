//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the upstream client (fatal on TLS bundle or base URL errors)
//! - Register the bridge service on the fabric
//! - Serve the ingress until shutdown, then unregister
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, ServiceConfig};
use crate::fabric::{Fabric, FabricError, MemoryFabric};
use crate::http::IngressServer;
use crate::service::ServiceRegistrar;
use crate::upstream::{TheHiveClient, UpstreamError, UpstreamSettings};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Upstream client error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Service registration failed: {0}")]
    Registration(#[from] FabricError),

    #[error("Ingress error: {0}")]
    Io(#[from] io::Error),
}

/// A built and registered bridge, ready to serve.
pub struct Application {
    config: ServiceConfig,
    fabric: MemoryFabric,
    service_type: String,
    topics: Vec<String>,
}

impl Application {
    /// Build the client and register the service on a fresh in-process fabric.
    pub fn build(config: ServiceConfig) -> Result<Self, StartupError> {
        Self::build_on(config, MemoryFabric::new())
    }

    /// Like [`Application::build`], registering on an existing fabric.
    pub fn build_on(config: ServiceConfig, fabric: MemoryFabric) -> Result<Self, StartupError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let settings = UpstreamSettings::from_config(&config);
        tracing::info!(
            base_url = %settings.base_url,
            auth = settings.credentials.scheme(),
            "Creating upstream client"
        );
        let client = Arc::new(TheHiveClient::new(settings)?);

        let registrar = ServiceRegistrar::new(client, config.discriminator().map(str::to_owned));
        let topics = registrar.register(&fabric, &config.general.api_names)?;

        Ok(Self {
            service_type: registrar.service_type(),
            config,
            fabric,
            topics,
        })
    }

    pub fn fabric(&self) -> &MemoryFabric {
        &self.fabric
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Topics the service answers on.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.fabric.request_timeout_secs)
    }

    /// Serve until the shutdown broadcast fires.
    ///
    /// Binds the configured ingress address when the ingress is enabled.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        if !self.config.ingress.enabled {
            tracing::info!("HTTP ingress disabled; serving the in-process fabric only");
            let mut shutdown = shutdown;
            let _ = shutdown.recv().await;
            self.stop();
            return Ok(());
        }

        let listener = TcpListener::bind(&self.config.ingress.bind_address).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve the ingress on `listener` until the shutdown broadcast fires.
    pub async fn serve(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        let server = IngressServer::new(self.fabric.clone(), &self.config);
        let result = server.run(listener, shutdown).await;
        self.stop();
        result.map_err(StartupError::from)
    }

    fn stop(&self) {
        if !self.fabric.unregister_service(&self.service_type) {
            tracing::warn!(service_type = %self.service_type, "Service was not registered at shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::fabric::Request;

    fn config(extra: &str) -> ServiceConfig {
        parse_config(&format!(
            r#"
            [general]
            host = "127.0.0.1"
            port = 1
            use_ssl = false
            api_names = ["get_case", "create_case"]
            api_principal = "key"
            {}

            [ingress]
            enabled = false
            "#,
            extra
        ))
        .unwrap()
    }

    #[test]
    fn test_build_registers_topics() {
        let app = Application::build(config("")).unwrap();
        assert_eq!(app.service_type(), "/opendxl-thehive/service/thehive-api");
        assert_eq!(app.topics().len(), 2);
        for topic in app.topics() {
            assert!(app.fabric().has_topic(topic));
        }
    }

    #[test]
    fn test_missing_bundle_is_fatal() {
        let mut config = config("");
        config.general.verify_cert_bundle = Some("/nonexistent/ca.pem".into());
        assert!(matches!(Application::build(config), Err(StartupError::Config(_))));
    }

    #[test]
    fn test_second_instance_needs_discriminator() {
        let fabric = MemoryFabric::new();
        Application::build_on(config(""), fabric.clone()).unwrap();

        let clash = Application::build_on(config(""), fabric.clone());
        assert!(matches!(clash, Err(StartupError::Registration(_))));

        let app = Application::build_on(config(r#"service_unique_id = "east""#), fabric).unwrap();
        assert!(app.topics()[0].starts_with("/opendxl-thehive/service/thehive-api/east/"));
    }

    #[tokio::test]
    async fn test_run_unregisters_on_shutdown() {
        let app = Application::build(config("")).unwrap();
        let fabric = app.fabric().clone();
        let topic = app.topics()[0].clone();

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(app.run(rx));
        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();

        assert!(!fabric.has_topic(&topic));
        let err = fabric
            .sync_request(Request::new(topic, "{}"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FabricError::NoService(_)));
    }
}
