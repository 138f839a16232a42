//! In-process fabric.
//!
//! # Responsibilities
//! - Keep the topic -> callback bindings of every registered service
//! - Run each request on its own task and hand the reply back to the caller
//! - Enforce the requester's timeout without cancelling the callback
//!
//! # Design Decisions
//! - Bindings live in a `DashMap`; lookups never block other topics
//! - A timed-out callback keeps running; its reply is dropped

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::fabric::message::{Request, Response};
use crate::fabric::service::{Fabric, FabricError, RequestCallback, ServiceRegistration};

/// A fabric whose requesters and services share one process.
#[derive(Clone, Default)]
pub struct MemoryFabric {
    /// Topic -> bound callback.
    topics: Arc<DashMap<String, Arc<dyn RequestCallback>>>,
    /// Service type -> topics it owns.
    services: Arc<DashMap<String, Vec<String>>>,
}

impl MemoryFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered services with their topics, sorted by service type.
    pub fn services(&self) -> Vec<(String, Vec<String>)> {
        let mut services: Vec<_> = self
            .services
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        services.sort_by(|a, b| a.0.cmp(&b.0));
        services
    }

    /// True if some service answers on `topic`.
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    fn unbind(&self, topics: &[String]) {
        for topic in topics {
            self.topics.remove(topic);
        }
    }
}

#[async_trait]
impl Fabric for MemoryFabric {
    fn register_service(&self, service: ServiceRegistration) -> Result<(), FabricError> {
        if self.services.contains_key(service.service_type()) {
            return Err(FabricError::ServiceExists(service.service_type().to_string()));
        }

        let mut bound = Vec::with_capacity(service.callbacks().len());
        for (topic, callback) in service.callbacks() {
            let inserted = match self.topics.entry(topic.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(callback.clone());
                    true
                }
            };
            if !inserted {
                self.unbind(&bound);
                return Err(FabricError::TopicInUse(topic.clone()));
            }
            bound.push(topic.clone());
        }

        tracing::info!(
            service_type = %service.service_type(),
            topic_count = bound.len(),
            "Service registered"
        );
        self.services.insert(service.service_type().to_string(), bound);
        Ok(())
    }

    fn unregister_service(&self, service_type: &str) -> bool {
        match self.services.remove(service_type) {
            Some((_, topics)) => {
                self.unbind(&topics);
                tracing::info!(service_type = %service_type, "Service unregistered");
                true
            }
            None => false,
        }
    }

    async fn sync_request(&self, request: Request, timeout: Duration) -> Result<Response, FabricError> {
        let callback = self
            .topics
            .get(&request.destination_topic)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FabricError::NoService(request.destination_topic.clone()))?;

        let topic = request.destination_topic.clone();
        let message_id = request.message_id;
        let task = tokio::spawn(async move { callback.on_request(request).await });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                tracing::error!(topic = %topic, message_id = %message_id, error = %e, "Request callback failed");
                Err(FabricError::CallbackFailed(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(topic = %topic, message_id = %message_id, timeout = ?timeout, "Request timed out");
                Err(FabricError::Timeout(timeout))
            }
        }
    }
}

impl std::fmt::Debug for MemoryFabric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFabric")
            .field("services", &self.services.len())
            .field("topics", &self.topics.len())
            .finish()
    }
}
