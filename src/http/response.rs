//! Ingress response rendering.
//!
//! # Responsibilities
//! - Render a fabric success as the raw JSON payload
//! - Render a structured error as `{error_code, error_message, detail}`
//! - Map fabric failures (no service, timeout) to HTTP status codes
//!
//! # Design Decisions
//! - Error status mirrors the upstream code when it is a 4xx/5xx
//! - Code-less errors are 500; other upstream codes are 502

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fabric::{FabricError, Response};

/// JSON body of an error reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_code: Option<u16>,
    pub error_message: String,
    pub detail: Option<Value>,
}

impl ErrorBody {
    fn new(error_code: Option<u16>, error_message: impl Into<String>, detail: &Bytes) -> Self {
        Self {
            error_code,
            error_message: error_message.into(),
            detail: decode_detail(detail),
        }
    }
}

fn decode_detail(detail: &Bytes) -> Option<Value> {
    if detail.is_empty() {
        return None;
    }
    Some(
        serde_json::from_slice(detail)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(detail).into_owned())),
    )
}

/// HTTP status for an error reply.
pub fn error_status(error_code: Option<u16>) -> StatusCode {
    match error_code {
        None => StatusCode::INTERNAL_SERVER_ERROR,
        Some(code) => StatusCode::from_u16(code)
            .ok()
            .filter(|status| status.is_client_error() || status.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
    }
}

/// Render a fabric reply.
pub fn render(response: Response) -> HttpResponse {
    match response {
        Response::Success { payload, .. } => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], payload).into_response()
        }
        Response::Error {
            error_code,
            error_message,
            payload,
            ..
        } => (
            error_status(error_code),
            Json(ErrorBody::new(error_code, error_message, &payload)),
        )
            .into_response(),
    }
}

/// Render a fabric failure.
pub fn render_fabric_error(error: &FabricError) -> HttpResponse {
    let status = match error {
        FabricError::NoService(_) => StatusCode::NOT_FOUND,
        FabricError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        FabricError::TopicInUse(_) | FabricError::ServiceExists(_) => StatusCode::CONFLICT,
        FabricError::CallbackFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorBody::new(None, error.to_string(), &Bytes::new()))).into_response()
}
