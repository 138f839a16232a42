//! Topic construction and service registration.
//!
//! # Responsibilities
//! - Resolve configured operation names, warning on unknown ones
//! - Compute each operation's topic (with the optional discriminator)
//! - Bind every topic to an `OperationHandler` and register the service
//!
//! # Topic Layout
//! ```text
//! /opendxl-thehive/service/thehive-api[/<discriminator>]/<suffix>
//!     e.g. /opendxl-thehive/service/thehive-api/east/case/task/create
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::fabric::{Fabric, FabricError, ServiceRegistration};
use crate::service::handler::OperationHandler;
use crate::service::operation::Operation;
use crate::upstream::TheHiveClient;

/// Service type every topic is rooted at.
pub const SERVICE_TYPE: &str = "/opendxl-thehive/service/thehive-api";

/// Root of this instance's topics.
pub fn service_type(discriminator: Option<&str>) -> String {
    match discriminator {
        Some(id) => format!("{}/{}", SERVICE_TYPE, id),
        None => SERVICE_TYPE.to_string(),
    }
}

/// Topic for `operation`.
pub fn topic_for(operation: Operation, discriminator: Option<&str>) -> String {
    format!("{}/{}", service_type(discriminator), operation.topic_suffix())
}

/// Map configured names to operations, in table order, without duplicates.
///
/// Unknown names are logged and skipped.
pub fn resolve_operations<S: AsRef<str>>(api_names: &[S]) -> Vec<Operation> {
    let mut operations = BTreeSet::new();
    for name in api_names.iter().map(|n| n.as_ref().trim()).filter(|n| !n.is_empty()) {
        match name.parse::<Operation>() {
            Ok(op) => {
                if !operations.insert(op) {
                    tracing::warn!(api_name = %name, "Duplicate API name in configuration");
                }
            }
            Err(e) => tracing::warn!(api_name = %name, "Skipping {}", e),
        }
    }
    operations.into_iter().collect()
}

/// A topic bound to an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub operation: Operation,
    pub topic: String,
}

/// Builds and registers the bridge service.
#[derive(Debug, Clone)]
pub struct ServiceRegistrar {
    client: Arc<TheHiveClient>,
    discriminator: Option<String>,
}

impl ServiceRegistrar {
    pub fn new(client: Arc<TheHiveClient>, discriminator: Option<String>) -> Self {
        Self {
            client,
            discriminator,
        }
    }

    pub fn service_type(&self) -> String {
        service_type(self.discriminator.as_deref())
    }

    /// Topics for the configured names.
    pub fn bindings<S: AsRef<str>>(&self, api_names: &[S]) -> Vec<Binding> {
        resolve_operations(api_names)
            .into_iter()
            .map(|operation| Binding {
                operation,
                topic: topic_for(operation, self.discriminator.as_deref()),
            })
            .collect()
    }

    /// The service registration for the configured names.
    pub fn registration<S: AsRef<str>>(&self, api_names: &[S]) -> ServiceRegistration {
        let mut service = ServiceRegistration::new(self.service_type());
        for binding in self.bindings(api_names) {
            tracing::info!(operation = %binding.operation, topic = %binding.topic, "Registering request callback");
            let handler = OperationHandler::new(binding.operation, self.client.clone());
            service.add_request_callback(binding.topic, Arc::new(handler));
        }
        service
    }

    /// Register the service on `fabric`. Returns the bound topics.
    pub fn register<S: AsRef<str>>(&self, fabric: &dyn Fabric, api_names: &[S]) -> Result<Vec<String>, FabricError> {
        let service = self.registration(api_names);
        let topics: Vec<String> = service.topics().map(str::to_owned).collect();
        if service.is_empty() {
            tracing::warn!(service_type = %service.service_type(), "No recognized API names; service exposes no topics");
        }
        tracing::info!(service_type = %service.service_type(), "Registering service");
        fabric.register_service(service)?;
        Ok(topics)
    }
}
