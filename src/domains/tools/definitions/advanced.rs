//! Webhook, log streaming, device posture and tailnet settings tools.

use std::sync::Arc;

use serde::Deserialize;

use super::NoParams;
use crate::domains::tools::outcome::ToolOutcome;
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ParamSpec, ToolSchema};
use crate::tailscale::TailscaleApi;
use crate::tailscale::types::{
    CreatePostureIntegrationRequest, CreateWebhookRequest, LogType, UpdateTailnetSettingsRequest,
};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateWebhookParams {
    pub endpoint_url: String,
    pub subscriptions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookIdParams {
    pub endpoint_id: String,
}

#[derive(Deserialize)]
pub struct CreatePostureParams {
    pub provider: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub tenant_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PostureIdParams {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSettingsParams {
    pub devices_approval_on: Option<bool>,
    pub devices_auto_updates_on: Option<bool>,
    pub devices_key_duration_days: Option<f64>,
    pub users_approval_on: Option<bool>,
    pub users_role_allowed_to_join_external_tailnets: Option<String>,
    pub network_flow_logging_on: Option<bool>,
    pub regional_routing_on: Option<bool>,
    pub posture_identity_collection_on: Option<bool>,
}

impl From<UpdateSettingsParams> for UpdateTailnetSettingsRequest {
    fn from(params: UpdateSettingsParams) -> Self {
        Self {
            devices_approval_on: params.devices_approval_on,
            devices_auto_updates_on: params.devices_auto_updates_on,
            devices_key_duration_days: params.devices_key_duration_days.map(|d| d as i64),
            users_approval_on: params.users_approval_on,
            users_role_allowed_to_join_external_tailnets: params
                .users_role_allowed_to_join_external_tailnets,
            network_flow_logging_on: params.network_flow_logging_on,
            regional_routing_on: params.regional_routing_on,
            posture_identity_collection_on: params.posture_identity_collection_on,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_webhooks(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result("list webhooks", "webhooks", api.list_webhooks().await)
}

async fn create_webhook(api: Arc<dyn TailscaleApi>, params: CreateWebhookParams) -> ToolOutcome {
    let request = CreateWebhookRequest {
        endpoint_url: params.endpoint_url,
        subscriptions: params.subscriptions,
    };
    ToolOutcome::from_result("create webhook", "webhook", api.create_webhook(&request).await)
}

async fn get_webhook(api: Arc<dyn TailscaleApi>, params: WebhookIdParams) -> ToolOutcome {
    ToolOutcome::from_result(
        "get webhook",
        "webhook",
        api.get_webhook(&params.endpoint_id).await,
    )
}

async fn delete_webhook(api: Arc<dyn TailscaleApi>, params: WebhookIdParams) -> ToolOutcome {
    let result = api.delete_webhook(&params.endpoint_id).await;
    ToolOutcome::confirm("delete webhook", result, || {
        format!("Webhook {} deleted successfully", params.endpoint_id)
    })
}

async fn configuration_logs(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result(
        "get configuration logs",
        "logs",
        api.logstream_configuration(LogType::Config).await,
    )
}

async fn network_logs(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result(
        "get network logs",
        "logs",
        api.logstream_configuration(LogType::Network).await,
    )
}

async fn list_posture_integrations(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result(
        "list posture integrations",
        "integrations",
        api.list_posture_integrations().await,
    )
}

async fn create_posture_integration(
    api: Arc<dyn TailscaleApi>,
    params: CreatePostureParams,
) -> ToolOutcome {
    let request = CreatePostureIntegrationRequest {
        provider: params.provider,
        client_id: params.client_id,
        client_secret: params.client_secret,
        tenant_id: params.tenant_id,
    };
    ToolOutcome::from_result(
        "create posture integration",
        "integration",
        api.create_posture_integration(&request).await,
    )
}

async fn get_posture_integration(api: Arc<dyn TailscaleApi>, params: PostureIdParams) -> ToolOutcome {
    ToolOutcome::from_result(
        "get posture integration",
        "integration",
        api.get_posture_integration(&params.id).await,
    )
}

async fn delete_posture_integration(
    api: Arc<dyn TailscaleApi>,
    params: PostureIdParams,
) -> ToolOutcome {
    let result = api.delete_posture_integration(&params.id).await;
    ToolOutcome::confirm("delete posture integration", result, || {
        format!("Posture integration {} deleted successfully", params.id)
    })
}

async fn get_settings(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result("get tailnet settings", "settings", api.tailnet_settings().await)
}

/// Patches the supplied fields, then reads the settings back.
async fn update_settings(api: Arc<dyn TailscaleApi>, params: UpdateSettingsParams) -> ToolOutcome {
    let request = UpdateTailnetSettingsRequest::from(params);
    if let Err(source) = api.update_tailnet_settings(&request).await {
        return ToolOutcome::RemoteFailure {
            operation: "update tailnet settings",
            source,
        };
    }
    ToolOutcome::from_result(
        "get updated tailnet settings",
        "settings",
        api.tailnet_settings().await,
    )
}

// ============================================================================
// Tool Definitions
// ============================================================================

/// Webhook, logging, posture and settings tools, in registration order.
pub fn catalog() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_webhooks_list",
                "List the webhook endpoints of the tailnet with their URLs, subscriptions and \
                 status. OAuth Scope: webhooks:read.",
            ),
            list_webhooks,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_webhook_create",
                "Create a webhook endpoint that receives tailnet events of the subscribed types \
                 (device changes, user events, ...). OAuth Scope: webhooks:write.",
            )
            .param(
                ParamSpec::string("endpoint_url", "The URL where webhook events will be sent")
                    .required(),
            )
            .param(
                ParamSpec::string_array("subscriptions", "List of event types to subscribe to")
                    .required(),
            ),
            create_webhook,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_webhook_get",
                "Get one webhook endpoint: configuration, subscriptions and delivery status. \
                 OAuth Scope: webhooks:read.",
            )
            .param(ParamSpec::string("endpoint_id", "The webhook endpoint ID").required()),
            get_webhook,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_webhook_delete",
                "Delete a webhook endpoint permanently; it stops receiving events. \
                 OAuth Scope: webhooks:write.",
            )
            .param(ParamSpec::string("endpoint_id", "The webhook endpoint ID to delete").required()),
            delete_webhook,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_logging_configuration_get",
                "Get the log streaming configuration for configuration audit logs (administrative \
                 and policy changes). See /kb/1349/log-events. OAuth Scope: logging:read.",
            ),
            configuration_logs,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_logging_network_get",
                "Get the log streaming configuration for network flow logs. \
                 See /kb/1349/log-events. OAuth Scope: logging:read.",
            ),
            network_logs,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_posture_integrations_list",
                "List the device posture integrations (CrowdStrike, Microsoft Intune, ...) of \
                 the tailnet. See /kb/1288/device-posture. OAuth Scope: posture:read.",
            ),
            list_posture_integrations,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_posture_integration_create",
                "Create a device posture integration with a security provider using its OAuth \
                 client credentials. OAuth Scope: posture:write.",
            )
            .param(
                ParamSpec::string(
                    "provider",
                    "The posture provider (e.g., 'crowdstrike', 'intune')",
                )
                .required(),
            )
            .param(
                ParamSpec::string("client_id", "OAuth client ID for the integration").required(),
            )
            .param(
                ParamSpec::string("client_secret", "OAuth client secret for the integration")
                    .required(),
            )
            .param(ParamSpec::string(
                "tenant_id",
                "Tenant ID (required for some providers)",
            )),
            create_posture_integration,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_posture_integration_get",
                "Get one device posture integration: configuration and connection status. \
                 OAuth Scope: posture:read.",
            )
            .param(ParamSpec::string("id", "The integration ID").required()),
            get_posture_integration,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_posture_integration_delete",
                "Delete a device posture integration permanently. Policies relying on its \
                 posture data may be affected. OAuth Scope: posture:write.",
            )
            .param(ParamSpec::string("id", "The integration ID to delete").required()),
            delete_posture_integration,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_tailnet_settings_get",
                "Get the tailnet settings: device and user approval, auto-updates, key duration, \
                 flow logging, regional routing and posture collection. \
                 OAuth Scope: settings:read.",
            ),
            get_settings,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_tailnet_settings_update",
                "Update tailnet settings. Only the supplied fields change. Settings affect every \
                 device and user in the tailnet. Returns the settings after the update. \
                 OAuth Scope: settings:write.",
            )
            .param(ParamSpec::boolean(
                "devices_approval_on",
                "Whether device approval is required",
            ))
            .param(ParamSpec::boolean(
                "devices_auto_updates_on",
                "Whether devices should auto-update",
            ))
            .param(ParamSpec::number(
                "devices_key_duration_days",
                "Default key duration in days",
            ))
            .param(ParamSpec::boolean(
                "users_approval_on",
                "Whether user approval is required",
            ))
            .param(ParamSpec::string(
                "users_role_allowed_to_join_external_tailnets",
                "Role allowed to join external tailnets",
            ))
            .param(ParamSpec::boolean(
                "network_flow_logging_on",
                "Whether network flow logging is enabled",
            ))
            .param(ParamSpec::boolean(
                "regional_routing_on",
                "Whether regional routing is enabled",
            ))
            .param(ParamSpec::boolean(
                "posture_identity_collection_on",
                "Whether posture identity collection is enabled",
            )),
            update_settings,
        ),
    ]
}
