//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol. The server only advertises tools; all of them come from the
//! [`ToolRegistry`] and are routed through a `ToolRouter` built from it
//! (see `domains/tools/router.rs`).

use rmcp::{
    ServerHandler,
    handler::server::tool::ToolRouter,
    model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::config::Config;
use crate::domains::tools::{ToolRegistry, build_tool_router};

const INSTRUCTIONS: &str = "Administer a Tailscale tailnet: devices, auth keys, users and \
contacts, DNS, the policy file, webhooks, log streaming, device posture integrations and \
tailnet settings. Every tool name starts with 'tailscale_'.";

/// The main MCP server handler.
///
/// Cloning is cheap; clones share the registry and its client handle.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Every tool the server exposes.
    registry: Arc<ToolRegistry>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server serving the tools in `registry`.
    pub fn new(config: Config, registry: ToolRegistry) -> Self {
        let registry = Arc::new(registry);
        Self {
            tool_router: build_tool_router::<Self>(registry.clone()),
            config: Arc::new(config),
            registry,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        ct: CancellationToken,
    ) -> CallToolResult {
        self.registry
            .dispatch(name, arguments, ct)
            .await
            .into_call_result()
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
