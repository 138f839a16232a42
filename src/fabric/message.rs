//! Fabric message types.
//!
//! # Responsibilities
//! - Carry the destination topic and raw payload of an inbound request
//! - Represent the single reply to a request (success or structured error)
//! - Provide JSON helpers for callers that speak JSON payloads
//!
//! # Design Decisions
//! - Payloads stay as raw bytes so success bodies are forwarded byte-for-byte
//! - Every response carries the message id of the request it answers

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// A request message delivered on a fabric topic.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique message identifier.
    pub message_id: Uuid,

    /// Topic the request was sent to.
    pub destination_topic: String,

    /// Raw request payload (JSON by convention).
    pub payload: Bytes,
}

impl Request {
    /// Create a request with a fresh message id.
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            destination_topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Create a request whose payload is the JSON encoding of `body`.
    pub fn json<T: Serialize>(topic: impl Into<String>, body: &T) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_vec(body)?;
        Ok(Self::new(topic, payload))
    }

    /// Override the message id (e.g. to reuse an ingress request id).
    pub fn with_message_id(mut self, message_id: Uuid) -> Self {
        self.message_id = message_id;
        self
    }

    /// Payload decoded as UTF-8 for logging. Invalid sequences are replaced.
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// The reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The request was handled; `payload` is the result body.
    Success {
        request_message_id: Uuid,
        payload: Bytes,
    },

    /// The request failed.
    Error {
        request_message_id: Uuid,
        /// Numeric error code (the upstream HTTP status when there is one).
        error_code: Option<u16>,
        /// Human-readable description.
        error_message: String,
        /// Supplementary detail, e.g. the upstream error body. May be empty.
        payload: Bytes,
    },
}

impl Response {
    /// Build a success reply to `request`.
    pub fn success(request: &Request, payload: impl Into<Bytes>) -> Self {
        Response::Success {
            request_message_id: request.message_id,
            payload: payload.into(),
        }
    }

    /// Build an error reply to `request` with no detail payload.
    pub fn error(request: &Request, error_code: Option<u16>, error_message: impl Into<String>) -> Self {
        Response::Error {
            request_message_id: request.message_id,
            error_code,
            error_message: error_message.into(),
            payload: Bytes::new(),
        }
    }

    /// Attach a detail payload to an error reply. No-op on success.
    pub fn with_detail(mut self, detail: impl Into<Bytes>) -> Self {
        if let Response::Error { payload, .. } = &mut self {
            *payload = detail.into();
        }
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Id of the request this response answers.
    pub fn request_message_id(&self) -> Uuid {
        match self {
            Response::Success { request_message_id, .. }
            | Response::Error { request_message_id, .. } => *request_message_id,
        }
    }

    pub fn error_code(&self) -> Option<u16> {
        match self {
            Response::Error { error_code, .. } => *error_code,
            Response::Success { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Response::Error { error_message, .. } => Some(error_message),
            Response::Success { .. } => None,
        }
    }

    /// Success body or error detail.
    pub fn payload(&self) -> &Bytes {
        match self {
            Response::Success { payload, .. } | Response::Error { payload, .. } => payload,
        }
    }

    /// Decode the payload as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_request_json_payload() {
        let req = Request::json("/a/b", &json!({"id": "42"})).unwrap();
        assert_eq!(req.destination_topic, "/a/b");
        assert_eq!(req.payload_str(), r#"{"id":"42"}"#);
    }

    #[test]
    fn test_response_carries_request_id() {
        let req = Request::new("/t", "{}");
        let ok = Response::success(&req, r#"{"x":1}"#);
        assert_eq!(ok.request_message_id(), req.message_id);
        assert!(!ok.is_error());
        assert_eq!(ok.json::<Value>().unwrap(), json!({"x": 1}));

        let err = Response::error(&req, Some(404), "not found").with_detail(r#"{"message":"not found"}"#);
        assert!(err.is_error());
        assert_eq!(err.error_code(), Some(404));
        assert_eq!(err.error_message(), Some("not found"));
        assert_eq!(err.json::<Value>().unwrap(), json!({"message": "not found"}));
    }

    #[test]
    fn test_with_detail_ignored_on_success() {
        let req = Request::new("/t", "{}");
        let ok = Response::success(&req, "[]").with_detail("ignored");
        assert_eq!(ok.payload(), &Bytes::from_static(b"[]"));
    }
}
