//! Translation of upstream HTTP responses into fabric responses.
//!
//! # Responsibilities
//! - Forward 2xx JSON bodies unchanged
//! - Turn any other status into a structured error carrying the status code
//! - Pull a short message out of the error body, falling back to a generic one
//!
//! # Message Precedence
//! ```text
//! {"message": m}                         → m
//! {"errors": [{"message": m}, ...]}      → m
//! {"errors": [[{"message": m}, ...]]}    → m
//! anything else                          → "Error handling request"
//! ```

use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::IgnoredAny;
use serde_json::Value;

use crate::fabric::{Request, Response};
use crate::upstream::UpstreamError;

/// Message used when the error body carries none.
pub const FALLBACK_ERROR_MESSAGE: &str = "Error handling request";

/// Build the reply to `request` from an upstream status and body.
///
/// Fails only when the body is not valid JSON.
pub fn translate(request: &Request, status: StatusCode, body: Bytes) -> Result<Response, UpstreamError> {
    if status.is_success() {
        serde_json::from_slice::<IgnoredAny>(&body)?;
        return Ok(Response::success(request, body));
    }

    let document: Value = serde_json::from_slice(&body)?;
    let error_message = match extract_error_message(&document) {
        Some(message) => {
            tracing::error!(
                topic = %request.destination_topic,
                message_id = %request.message_id,
                status = status.as_u16(),
                "Error handling request: {}",
                message
            );
            message
        }
        None => {
            tracing::error!(
                topic = %request.destination_topic,
                message_id = %request.message_id,
                status = status.as_u16(),
                "{}",
                FALLBACK_ERROR_MESSAGE
            );
            FALLBACK_ERROR_MESSAGE.to_string()
        }
    };

    Ok(Response::error(request, Some(status.as_u16()), error_message).with_detail(body))
}

/// Extract a short error description from an upstream error body.
pub fn extract_error_message(document: &Value) -> Option<String> {
    message_field(document).or_else(|| {
        let first = document.get("errors")?.as_array()?.first()?;
        match first {
            Value::Object(_) => message_field(first),
            Value::Array(nested) => nested.first().and_then(message_field),
            _ => None,
        }
    })
}

fn message_field(value: &Value) -> Option<String> {
    value
        .get("message")?
        .as_str()
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}
