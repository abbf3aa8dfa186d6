//! Tools domain module.
//!
//! Every Tailscale administration operation is exposed as an MCP tool.
//!
//! ## Architecture
//!
//! - `definitions/` - Tool catalog, one file per administration area
//! - `schema.rs` - Declarative parameter schemas and argument validation
//! - `outcome.rs` - What a call produced and how it renders for the client
//! - `registry.rs` - Central tool registry and dispatch (all transports)
//! - `router.rs` - rmcp ToolRouter built from the registry (STDIO transport)
//! - `error.rs` - Registry construction errors
//!
//! ## Adding a New Tool
//!
//! 1. Add a params struct and an async handler in the matching `definitions/` file
//! 2. Append a `ToolDefinition` to that file's `catalog()`
//!
//! The router and the HTTP transport pick it up from the registry.

pub mod definitions;
mod error;
mod outcome;
mod registry;
pub mod router;
pub mod schema;

pub use error::ToolError;
pub use outcome::ToolOutcome;
pub use registry::{ToolDefinition, ToolRegistry};
pub use router::build_tool_router;
pub use schema::{ParamKind, ParamSpec, ToolSchema};
