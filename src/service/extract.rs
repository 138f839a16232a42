//! Field extraction from request payloads.

use serde_json::{Map, Value};
use thiserror::Error;

/// Why a path parameter could not be taken from a request.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Request payload must be a JSON object")]
    NotAnObject,

    #[error("Attribute '{0}' is missing")]
    Missing(&'static str),

    #[error("Attribute '{0}' must be a string or integer")]
    InvalidType(&'static str),
}

/// Pop `field` from the JSON object in `payload`.
///
/// Returns the field as a string together with the remaining fields. Null and
/// empty-string values count as missing.
pub fn pop_attribute(payload: &[u8], field: &'static str) -> Result<(String, Map<String, Value>), ExtractError> {
    let mut body = match serde_json::from_slice::<Value>(payload)? {
        Value::Object(body) => body,
        _ => return Err(ExtractError::NotAnObject),
    };

    let value = match body.remove(field) {
        None | Some(Value::Null) => return Err(ExtractError::Missing(field)),
        Some(Value::String(s)) if s.is_empty() => return Err(ExtractError::Missing(field)),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
        Some(_) => return Err(ExtractError::InvalidType(field)),
    };

    Ok((value, body))
}
