//! Service registration and request callback contracts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::fabric::message::{Request, Response};

/// Invoked for each request delivered on a bound topic.
///
/// The returned [`Response`] is the reply sent back to the requester, so a
/// callback produces exactly one reply per request.
#[async_trait]
pub trait RequestCallback: Send + Sync + 'static {
    async fn on_request(&self, request: Request) -> Response;
}

/// A named service and the topics it answers on.
#[derive(Clone)]
pub struct ServiceRegistration {
    service_type: String,
    callbacks: Vec<(String, Arc<dyn RequestCallback>)>,
}

impl ServiceRegistration {
    pub fn new(service_type: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            callbacks: Vec::new(),
        }
    }

    /// Bind `callback` to `topic`.
    pub fn add_request_callback(&mut self, topic: impl Into<String>, callback: Arc<dyn RequestCallback>) {
        self.callbacks.push((topic.into(), callback));
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Bound topics in registration order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.callbacks.iter().map(|(topic, _)| topic.as_str())
    }

    pub fn callbacks(&self) -> &[(String, Arc<dyn RequestCallback>)] {
        &self.callbacks
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistration")
            .field("service_type", &self.service_type)
            .field("topics", &self.topics().collect::<Vec<_>>())
            .finish()
    }
}

/// Errors raised by the fabric itself (never by a callback's business logic).
#[derive(Debug, Error)]
pub enum FabricError {
    /// No callback is bound to the topic.
    #[error("No service registered for topic '{0}'")]
    NoService(String),

    /// Another service already answers on the topic.
    #[error("Topic '{0}' is already registered")]
    TopicInUse(String),

    /// The service type is already registered.
    #[error("Service '{0}' is already registered")]
    ServiceExists(String),

    /// The requester's timeout elapsed before a reply arrived.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The callback task ended without producing a reply.
    #[error("Request callback failed: {0}")]
    CallbackFailed(String),
}

/// The publish/subscribe fabric as seen by this service.
#[async_trait]
pub trait Fabric: Send + Sync + 'static {
    /// Bind every topic of `service` to its callback.
    ///
    /// Registration is all-or-nothing: if any topic is taken, nothing is bound.
    fn register_service(&self, service: ServiceRegistration) -> Result<(), FabricError>;

    /// Remove a service and all of its topics. Returns false if unknown.
    fn unregister_service(&self, service_type: &str) -> bool;

    /// Send `request` and wait up to `timeout` for its reply.
    async fn sync_request(&self, request: Request, timeout: Duration) -> Result<Response, FabricError>;
}
