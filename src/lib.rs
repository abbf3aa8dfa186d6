//! Tailnet MCP Server Library
//!
//! A Model Context Protocol (MCP) server that lets an assistant administer a
//! Tailscale tailnet through the Tailscale v2 admin API.
//!
//! # Architecture
//!
//! - **core**: configuration, credential resolution, error handling, the MCP
//!   server handler and the transports (STDIO, HTTP)
//! - **domains::tools**: the tool registry, schemas, outcome rendering and the
//!   tool catalogs (devices, keys, users, DNS and policy, advanced)
//! - **tailscale**: the `TailscaleApi` client trait, its HTTP implementation,
//!   OAuth token handling and the shared client handle
//!
//! # Example
//!
//! ```rust,no_run
//! use tailnet_mcp_server::core::{Config, Credentials, McpServer};
//! use tailnet_mcp_server::domains::tools::ToolRegistry;
//! use tailnet_mcp_server::tailscale::ClientHandle;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let credentials = Credentials::resolve(&config.tailscale)?;
//!     let handle = ClientHandle::connect(&credentials, &config.tailscale)?;
//!     let registry = ToolRegistry::build(handle)?;
//!     let server = McpServer::new(config, registry);
//!     // Start the transport...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;
pub mod tailscale;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
