// Client error types
use std::collections::BTreeMap;

use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::session::SessionError;

/// Failure of a single backend operation. Nothing here is fatal to the
/// process; callers report it and keep their previous state.
#[derive(Debug, Error)]
pub enum ClientError {
    // Transport failure (DNS, connection reset, TLS)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    // Any non-2xx other than 401
    #[error("{message}")]
    Http { status: u16, message: String },

    // 401: session already cleared
    #[error("Unauthorized: session cleared, sign in again ({redirect})")]
    Unauthorized { redirect: String },

    // Client-side check failed; request was never sent
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ClientError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Http { status: 404, .. } => "NOT_FOUND",
            ClientError::Http { status: 403, .. } => "FORBIDDEN",
            ClientError::Http { status, .. } if *status >= 500 => "SERVER_ERROR",
            ClientError::Http { .. } => "HTTP_ERROR",
            ClientError::Unauthorized { .. } => "UNAUTHORIZED",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Decode(_) => "INVALID_RESPONSE",
            ClientError::Url(_) => "INVALID_URL",
            ClientError::Session(_) => "SESSION_ERROR",
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    pub fn to_json(&self) -> Value {
        match self {
            ClientError::Validation { message, field_errors } => json!({
                "error": true,
                "message": message,
                "code": self.error_code(),
                "field_errors": field_errors,
            }),
            _ => json!({
                "error": true,
                "message": self.to_string(),
                "code": self.error_code(),
            }),
        }
    }
}

impl ClientError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ClientError::Http { status, message: message.into() }
    }

    pub fn unauthorized(redirect: impl Into<String>) -> Self {
        ClientError::Unauthorized { redirect: redirect.into() }
    }

    pub fn validation(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        ClientError::Validation { message: message.into(), field_errors }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ClientError::Decode(message.into())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
