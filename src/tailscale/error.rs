//! Errors produced while talking to the Tailscale API.

use thiserror::Error;

/// Result type for remote API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A failed remote API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The API accepted the request but rejected its content (e.g. an invalid policy file).
    #[error("{0}")]
    Rejected(String),

    /// The OAuth token endpoint refused to issue a token.
    #[error("OAuth token request failed: {0}")]
    Token(String),
}

impl ApiError {
    /// Build a status error from a response body, preferring the API's own `message` field.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "empty response".to_string()
                } else {
                    trimmed.to_string()
                }
            });
        Self::Status { status, message }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn token(msg: impl Into<String>) -> Self {
        Self::Token(msg.into())
    }

    /// HTTP status, when the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors raised while building or probing the shared client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("failed to build Tailscale client: {0}")]
    Build(String),

    /// The startup connectivity check failed.
    #[error("failed to validate Tailscale connection: {0}")]
    Connectivity(#[source] ApiError),
}
