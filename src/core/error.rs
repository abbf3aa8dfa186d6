//! Error types and handling for the MCP server.
//!
//! Startup failures (configuration, client construction, the connectivity
//! probe, transport setup) all funnel into [`Error`]. Tool failures never do:
//! they are rendered into tool results by the tools domain.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The Tailscale client could not be built or reached.
    #[error(transparent)]
    Client(#[from] crate::tailscale::ClientError),

    /// Error originating from the tools domain.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::domains::tools::ToolError),

    /// The transport failed to start or stopped abnormally.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
