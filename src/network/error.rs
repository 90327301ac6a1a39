use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::constants::GENERAL_ERROR_MESSAGE;

/// JSON body the control API sends along with an error status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "invalidToken")]
    pub invalid_token: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Stand-in used when the failed response carries no readable JSON: the
    /// server did not answer, so the session is treated as lost.
    pub fn general() -> Self {
        Self {
            message: Some(GENERAL_ERROR_MESSAGE.to_string()),
            invalid_token: true,
            error: None,
        }
    }

    /// Text for the error banner.
    pub fn display_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| GENERAL_ERROR_MESSAGE.to_string())
    }
}

/// Why a request did not produce a payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No usable JSON answer: the network call failed or the body could not
    /// be decoded.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server refused the session credentials.
    #[error("Invalid session: {message}")]
    InvalidSession { message: String },

    /// The server answered with an error that does not concern the session.
    #[error("API error {status}: {message}")]
    Application { status: u16, message: String },

    /// The request could not be built (unknown method, parameters that do
    /// not serialise).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RequestError {
    /// Whether the stored token must be dropped and the login shown again.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidSession { .. })
    }

    /// Message rendered in the `#error` banner.
    pub fn banner_message(&self) -> &str {
        match self {
            Self::Transport(_) => GENERAL_ERROR_MESSAGE,
            Self::InvalidSession { message } | Self::Application { message, .. } => message,
            Self::InvalidRequest(detail) => detail,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::InvalidSession { .. } => "invalidSession",
            Self::Application { .. } => "application",
            Self::InvalidRequest(_) => "invalidRequest",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorReport<'a> {
    kind: &'a str,
    message: &'a str,
    invalid_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
}

impl From<RequestError> for JsValue {
    fn from(err: RequestError) -> Self {
        let report = ErrorReport {
            kind: err.kind(),
            message: err.banner_message(),
            invalid_token: err.invalidates_session(),
            status: match &err {
                RequestError::Application { status, .. } => Some(*status),
                _ => None,
            },
        };
        serde_wasm_bindgen::to_value(&report)
            .unwrap_or_else(|_| JsValue::from_str(&err.to_string()))
    }
}
