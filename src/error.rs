//! Error types for arriva

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur in the relay, the tool layer, or the session
#[derive(Debug, Error)]
pub enum ArrivaError {
    /// Missing or invalid shared token
    #[error("Unauthorized: Token not provided or invalid")]
    Unauthorized,

    /// A provider API key is not configured
    #[error("{0} API key not configured")]
    MissingApiKey(&'static str),

    /// Request input failed validation
    #[error("{0}")]
    Validation(String),

    /// Upstream call failed; the client only sees the operation name
    #[error("Failed to fetch {operation}: {reason}")]
    Upstream {
        operation: &'static str,
        reason: String,
    },

    /// Upstream answered with a non-success status (photo passthrough)
    #[error("Upstream responded {status}: {text}")]
    UpstreamStatus { status: StatusCode, text: String },

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    /// A connect was requested while a session is connecting or connected
    #[error("Session already active")]
    SessionActive,

    /// A close was requested with no open session
    #[error("Session not connected")]
    NotConnected,

    /// Realtime transport failure
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for arriva operations
pub type Result<T> = std::result::Result<T, ArrivaError>;

impl ArrivaError {
    /// Shorthand for an upstream failure on a named operation
    pub fn upstream(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Upstream {
            operation,
            reason: reason.into(),
        }
    }

    /// HTTP status this error maps to at the relay boundary
    pub fn status(&self) -> StatusCode {
        match self {
            ArrivaError::Unauthorized => StatusCode::UNAUTHORIZED,
            ArrivaError::Validation(_) => StatusCode::BAD_REQUEST,
            ArrivaError::UpstreamStatus { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ArrivaError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ArrivaError::Unauthorized | ArrivaError::MissingApiKey(_) => {
                let body = serde_json::json!({ "error": self.to_string() });
                (status, axum::Json(body)).into_response()
            }
            // Provider detail stays in the logs
            ArrivaError::Upstream { operation, .. } => {
                let body = serde_json::json!({ "error": format!("Failed to fetch {operation}") });
                (status, axum::Json(body)).into_response()
            }
            ArrivaError::Validation(msg) => (status, msg).into_response(),
            ArrivaError::UpstreamStatus { text, .. } => (status, text).into_response(),
            _ => (status, "Internal Server Error").into_response(),
        }
    }
}
