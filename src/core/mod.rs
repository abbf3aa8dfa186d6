//! Core module containing shared infrastructure components.
//!
//! Configuration, credential resolution, error handling, the MCP server
//! handler and the transport layer.

pub mod config;
pub mod credentials;
pub mod error;
pub mod server;
pub mod transport;

pub use config::Config;
pub use credentials::{AuthMode, Credentials};
pub use error::{Error, Result};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
