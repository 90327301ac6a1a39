//! Turning a [`RawResponse`] into a payload or a [`RequestError`].

use serde_json::Value;

use super::error::{ErrorBody, RequestError};
use super::request::RawResponse;
use crate::constants::OFFLINE_MESSAGE;

pub fn into_result(response: RawResponse) -> Result<Value, RequestError> {
    if response.is_success() {
        decode_payload(&response.body)
    } else {
        Err(classify_failure(response.status, &response.body))
    }
}

/// Decode a success body once.  Some endpoints send their JSON wrapped in a
/// JSON string; in that case the inner document is returned.
pub fn decode_payload(body: &str) -> Result<Value, RequestError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    let value: Value = serde_json::from_str(body)
        .map_err(|e| RequestError::Transport(format!("invalid JSON in response: {}", e)))?;
    Ok(unwrap_double_encoded(value))
}

fn unwrap_double_encoded(value: Value) -> Value {
    match value {
        Value::String(inner) => match serde_json::from_str::<Value>(&inner) {
            Ok(decoded @ (Value::Object(_) | Value::Array(_))) => decoded,
            _ => Value::String(inner),
        },
        other => other,
    }
}

/// Read the error object out of a failed response.
///
/// `None` means the server explicitly answered `null`.  Anything that is not
/// a JSON object is replaced by [`ErrorBody::general`].
pub fn error_body(body: &str) -> Option<ErrorBody> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => None,
        Ok(object @ Value::Object(_)) => {
            Some(serde_json::from_value(object).unwrap_or_else(|_| ErrorBody::general()))
        }
        _ => Some(ErrorBody::general()),
    }
}

pub fn classify_failure(status: u16, body: &str) -> RequestError {
    match error_body(body) {
        None => RequestError::InvalidSession { message: OFFLINE_MESSAGE.to_string() },
        Some(err) if err.invalid_token => RequestError::InvalidSession { message: err.display_message() },
        Some(err) => RequestError::Application { status, message: err.display_message() },
    }
}
