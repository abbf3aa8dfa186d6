//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Every registered tool gets one route. Routes carry no logic of their own:
//! they hand the call to [`ToolRegistry::dispatch`] together with the
//! request's cancellation token.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
};

use super::registry::ToolRegistry;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .definitions()
        .fold(ToolRouter::new(), |router, tool| {
            let name = tool.name();
            let registry = registry.clone();
            router.with_route(ToolRoute::new_dyn(
                tool.to_tool(),
                move |ctx: ToolCallContext<'_, S>| {
                    let registry = registry.clone();
                    let arguments = ctx.arguments.clone();
                    let ct = ctx.request_context.ct.clone();
                    async move {
                        let outcome = registry.dispatch(name, arguments, ct).await;
                        Ok::<_, McpError>(outcome.into_call_result())
                    }
                    .boxed()
                },
            ))
        })
}
