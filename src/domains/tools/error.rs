//! Tool-specific error types.

use thiserror::Error;

/// Errors raised while assembling the tool registry.
///
/// Per-call failures are not errors at this level; they are reported to the
/// client as error results (see [`ToolOutcome`](super::ToolOutcome)).
#[derive(Debug, Error)]
pub enum ToolError {
    /// Two tools were registered under the same name.
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(&'static str),

    /// A tool declares the same parameter twice.
    #[error("Tool {tool} declares parameter '{param}' more than once")]
    DuplicateParam {
        tool: &'static str,
        param: &'static str,
    },
}
