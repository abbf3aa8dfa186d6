//! Result of a single tool invocation.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::tailscale::{ApiError, ApiResult};

/// What a tool call produced.
///
/// Only [`ToolOutcome::Success`] renders as a non-error result; every other
/// variant becomes an error result carrying a human-readable message.
#[derive(Debug)]
pub enum ToolOutcome {
    /// Text payload: pretty JSON, raw policy text, or a confirmation.
    Success(String),

    /// Arguments failed validation or typed decoding.
    InvalidArguments(String),

    /// No tool is registered under this name.
    UnknownTool(String),

    /// The remote API returned an error.
    RemoteFailure {
        operation: &'static str,
        source: ApiError,
    },

    /// The remote API rejected a policy during validation.
    PolicyRejected(ApiError),

    /// A successful response could not be rendered as JSON.
    Serialization {
        subject: &'static str,
        source: serde_json::Error,
    },

    /// The operation has no remote counterpart.
    Unsupported(&'static str),

    /// The client cancelled the request before it completed.
    Cancelled,
}

impl ToolOutcome {
    /// Render `value` as 2-space indented JSON.
    pub fn json<T: Serialize + ?Sized>(subject: &'static str, value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::Success(text),
            Err(source) => Self::Serialization { subject, source },
        }
    }

    /// Pretty JSON on success, `Failed to <operation>: ...` otherwise.
    pub fn from_result<T: Serialize>(
        operation: &'static str,
        subject: &'static str,
        result: ApiResult<T>,
    ) -> Self {
        match result {
            Ok(value) => Self::json(subject, &value),
            Err(source) => Self::RemoteFailure { operation, source },
        }
    }

    /// Confirmation text on success, `Failed to <operation>: ...` otherwise.
    pub fn confirm(
        operation: &'static str,
        result: ApiResult<()>,
        message: impl FnOnce() -> String,
    ) -> Self {
        match result {
            Ok(()) => Self::Success(message()),
            Err(source) => Self::RemoteFailure { operation, source },
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Success(_))
    }

    pub fn into_call_result(self) -> CallToolResult {
        let is_error = self.is_error();
        let content = vec![Content::text(self.to_string())];
        if is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

impl std::fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(text) => f.write_str(text),
            Self::InvalidArguments(reason) => write!(f, "Invalid arguments: {}", reason),
            Self::UnknownTool(name) => write!(f, "Unknown tool: {}", name),
            Self::RemoteFailure { operation, source } => {
                write!(f, "Failed to {}: {}", operation, source)
            }
            Self::PolicyRejected(source) => write!(f, "Policy validation failed: {}", source),
            Self::Serialization { subject, source } => {
                write!(f, "Failed to serialize {}: {}", subject, source)
            }
            Self::Unsupported(message) => f.write_str(message),
            Self::Cancelled => f.write_str("Request cancelled"),
        }
    }
}
