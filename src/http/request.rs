//! Ingress request handling.
//!
//! # Responsibilities
//! - Turn an HTTP path into a fabric topic
//! - Reuse the ingress request ID as the fabric message id
//! - Carry the raw body as the fabric payload
//!
//! # Design Decisions
//! - Request ID assigned as early as possible (tower-http layer) for tracing
//! - Non-UUID request IDs from clients are ignored, a fresh message id is used

use axum::http::HeaderMap;
use bytes::Bytes;
use uuid::Uuid;

use crate::fabric::Request;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Topic addressed by an ingress path (the path with a leading slash).
pub fn topic_from_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Request ID from `headers`, when it is a UUID.
pub fn request_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

/// Build the fabric request for an ingress call.
pub fn to_fabric_request(path: &str, headers: &HeaderMap, body: Bytes) -> Request {
    let request = Request::new(topic_from_path(path), body);
    match request_id(headers) {
        Some(id) => request.with_message_id(id),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_topic_from_path() {
        assert_eq!(
            topic_from_path("opendxl-thehive/service/thehive-api/case/get"),
            "/opendxl-thehive/service/thehive-api/case/get"
        );
        assert_eq!(topic_from_path("/a/b"), "/a/b");
    }

    #[test]
    fn test_request_id_reused() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_str(&id.to_string()).unwrap());

        let request = to_fabric_request("a/b", &headers, Bytes::from_static(b"{}"));
        assert_eq!(request.message_id, id);
        assert_eq!(request.destination_topic, "/a/b");
    }

    #[test]
    fn test_non_uuid_request_id_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc"));
        assert_eq!(request_id(&headers), None);
        let request = to_fabric_request("a", &headers, Bytes::new());
        assert!(!request.message_id.is_nil());
    }
}
