//! Request handling for one operation.
//!
//! # Responsibilities
//! - Log every inbound request before acting on it
//! - Take the path parameter out of the payload when the operation needs one
//! - Call the upstream client with the rendered path and body
//!
//! # Design Decisions
//! - A request that cannot supply its path parameter is answered with a
//!   code-less error; it never reaches the upstream server
//! - Operations without a path parameter forward the payload untouched

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;

use crate::fabric::{Request, RequestCallback, Response};
use crate::observability::metrics;
use crate::service::extract::{pop_attribute, ExtractError};
use crate::service::operation::{Operation, Verb};
use crate::upstream::TheHiveClient;

/// Fabric callback bound to one [`Operation`].
#[derive(Debug, Clone)]
pub struct OperationHandler {
    operation: Operation,
    client: Arc<TheHiveClient>,
}

impl OperationHandler {
    pub fn new(operation: Operation, client: Arc<TheHiveClient>) -> Self {
        Self { operation, client }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    async fn handle(&self, request: &Request) -> Response {
        let descriptor = self.operation.descriptor();

        let Some(field) = descriptor.path_param else {
            let path = descriptor.render_path(None);
            return match descriptor.verb {
                Verb::Get => self.client.get(request, &path).await,
                Verb::Post => self.client.post(request, &path, None).await,
            };
        };

        let (value, remaining) = match pop_attribute(&request.payload, field) {
            Ok(extracted) => extracted,
            Err(e) => return self.reject(request, e),
        };

        let path = descriptor.render_path(Some(&value));
        match descriptor.verb {
            Verb::Get => self.client.get(request, &path).await,
            Verb::Post => self.client.post(request, &path, Some(Value::Object(remaining))).await,
        }
    }

    fn reject(&self, request: &Request, error: ExtractError) -> Response {
        tracing::error!(
            operation = %self.operation,
            topic = %request.destination_topic,
            message_id = %request.message_id,
            "Error handling request: {}",
            error
        );
        Response::error(request, None, error.to_string())
    }
}

#[async_trait]
impl RequestCallback for OperationHandler {
    async fn on_request(&self, request: Request) -> Response {
        tracing::info!(
            operation = %self.operation,
            message_id = %request.message_id,
            "Request received on topic: '{}' with payload: '{}'",
            request.destination_topic,
            request.payload_str()
        );

        let start = Instant::now();
        let response = self.handle(&request).await;
        metrics::record_request(self.operation.name(), &response, start);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{CertificateVerification, Credentials, UpstreamSettings};
    use std::time::Duration;

    // Nothing listens on port 1; any request that reaches the client fails at transport.
    fn handler(operation: Operation) -> OperationHandler {
        let client = TheHiveClient::new(UpstreamSettings {
            base_url: "http://127.0.0.1:1".into(),
            credentials: Credentials::None,
            verification: CertificateVerification::Enabled,
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(1),
        })
        .unwrap();
        OperationHandler::new(operation, Arc::new(client))
    }

    #[tokio::test]
    async fn test_missing_id_is_rejected() {
        let request = Request::new("/opendxl-thehive/service/thehive-api/case/get", r#"{"title":"x"}"#);
        let response = handler(Operation::GetCase).on_request(request.clone()).await;

        assert_eq!(response.request_message_id(), request.message_id);
        assert_eq!(response.error_code(), None);
        assert_eq!(response.error_message(), Some("Attribute 'id' is missing"));
    }

    #[tokio::test]
    async fn test_missing_case_id_is_rejected() {
        let request = Request::new("/t", r#"{"caseId":"","title":"T"}"#);
        let response = handler(Operation::CreateCaseTask).on_request(request).await;
        assert_eq!(response.error_message(), Some("Attribute 'caseId' is missing"));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_rejected() {
        let request = Request::new("/t", "id=42");
        let response = handler(Operation::GetAlert).on_request(request).await;
        assert_eq!(response.error_code(), None);
        assert!(response.error_message().unwrap().starts_with("Invalid JSON payload"));
    }

    #[tokio::test]
    async fn test_valid_request_reaches_client() {
        let request = Request::new("/t", r#"{"id":"42"}"#);
        let response = handler(Operation::GetCase).on_request(request).await;
        assert!(response.is_error());
        assert_eq!(response.error_code(), None);
        assert_ne!(response.error_message(), Some("Attribute 'id' is missing"));
    }
}
