//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - [`ToolDefinition`]: a tool's schema paired with its typed handler
//! - [`ToolRegistry`]: the immutable set of tools, built once at startup
//! - Dispatch of a call by name, shared by every transport

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use rmcp::model::{JsonObject, Tool};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::definitions;
use super::error::ToolError;
use super::outcome::ToolOutcome;
use super::schema::ToolSchema;
use crate::tailscale::{ClientHandle, TailscaleApi};

type Handler =
    Box<dyn Fn(Arc<dyn TailscaleApi>, JsonObject) -> BoxFuture<'static, ToolOutcome> + Send + Sync>;

// ============================================================================
// Tool Definition
// ============================================================================

/// One registered tool: what it accepts and what it does.
pub struct ToolDefinition {
    schema: ToolSchema,
    handler: Handler,
}

impl ToolDefinition {
    /// Pair a schema with a handler taking typed parameters.
    ///
    /// Arguments reach the handler only after they passed schema validation
    /// and decoded into `P`.
    pub fn new<P, F, Fut>(schema: ToolSchema, handler: F) -> Self
    where
        P: DeserializeOwned + Send + 'static,
        F: Fn(Arc<dyn TailscaleApi>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolOutcome> + Send + 'static,
    {
        let handler: Handler = Box::new(move |api, args| {
            match serde_json::from_value::<P>(serde_json::Value::Object(args)) {
                Ok(params) => handler(api, params).boxed(),
                Err(e) => futures::future::ready(ToolOutcome::InvalidArguments(e.to_string()))
                    .boxed(),
            }
        });
        Self { schema, handler }
    }

    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    /// Tool model (metadata) as advertised to clients.
    pub fn to_tool(&self) -> Tool {
        self.schema.to_tool()
    }

    /// Validate `arguments` and run the handler against `api`.
    pub fn invoke(
        &self,
        api: Arc<dyn TailscaleApi>,
        arguments: Option<JsonObject>,
    ) -> BoxFuture<'static, ToolOutcome> {
        match self.schema.validate(arguments) {
            Ok(args) => (self.handler)(api, args),
            Err(reason) => futures::future::ready(ToolOutcome::InvalidArguments(reason)).boxed(),
        }
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.schema.name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Every tool the server exposes, indexed by name.
///
/// Built once; never mutated afterwards. Both the rmcp router and the HTTP
/// transport dispatch through the same registry.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<&'static str, usize>,
    handle: ClientHandle,
}

impl ToolRegistry {
    /// Register the full catalog (devices, keys, users, DNS/policy, advanced).
    pub fn build(handle: ClientHandle) -> Result<Self, ToolError> {
        let catalog = [
            definitions::devices::catalog(),
            definitions::keys::catalog(),
            definitions::users::catalog(),
            definitions::dns::catalog(),
            definitions::advanced::catalog(),
        ]
        .into_iter()
        .flatten()
        .collect();

        let registry = Self::from_definitions(handle, catalog)?;
        info!("Registered {} tools", registry.len());
        Ok(registry)
    }

    /// Register an explicit list of tools.
    ///
    /// Fails on the first duplicated tool name or duplicated parameter name.
    pub fn from_definitions(
        handle: ClientHandle,
        tools: Vec<ToolDefinition>,
    ) -> Result<Self, ToolError> {
        let mut index = HashMap::with_capacity(tools.len());
        for (position, tool) in tools.iter().enumerate() {
            if let Some(param) = tool.schema().duplicate_param() {
                return Err(ToolError::DuplicateParam {
                    tool: tool.name(),
                    param,
                });
            }
            if index.insert(tool.name(), position).is_some() {
                return Err(ToolError::DuplicateTool(tool.name()));
            }
        }
        Ok(Self {
            tools,
            index,
            handle,
        })
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(ToolDefinition::name).collect()
    }

    /// Registered definitions, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    /// Get all tools as Tool models (metadata).
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDefinition::to_tool).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Run one tool call to completion.
    ///
    /// The handler runs against the client current at dispatch time and is
    /// abandoned as soon as `ct` fires.
    #[instrument(skip(self, arguments, ct))]
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        ct: CancellationToken,
    ) -> ToolOutcome {
        let Some(tool) = self.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolOutcome::UnknownTool(name.to_string());
        };

        info!("Tool called: {}", name);
        let call = tool.invoke(self.handle.get_client(), arguments);

        let outcome = tokio::select! {
            biased;
            _ = ct.cancelled() => ToolOutcome::Cancelled,
            outcome = call => outcome,
        };

        if outcome.is_error() {
            warn!("Tool {} failed: {}", name, outcome);
        }
        outcome
    }
}
