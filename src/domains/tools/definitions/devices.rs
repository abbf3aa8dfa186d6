//! Device management tools.
//!
//! Listing, inspection, authorization, naming, tagging, key expiry and
//! subnet routes of the machines in the tailnet.

use std::sync::Arc;

use serde::Deserialize;

use super::fields_param;
use crate::domains::tools::outcome::ToolOutcome;
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ParamSpec, ToolSchema};
use crate::tailscale::TailscaleApi;
use crate::tailscale::types::{DeviceKey, FieldSet};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListDevicesParams {
    #[serde(default)]
    pub fields: FieldSet,
}

#[derive(Debug, Deserialize)]
pub struct DeviceParams {
    pub device_id: String,
    #[serde(default)]
    pub fields: FieldSet,
}

#[derive(Debug, Deserialize)]
pub struct DeviceIdParams {
    pub device_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub device_id: String,
    pub authorized: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetNameParams {
    pub device_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetTagsParams {
    pub device_id: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoutesParams {
    pub device_id: String,
    pub routes: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_devices(api: Arc<dyn TailscaleApi>, params: ListDevicesParams) -> ToolOutcome {
    ToolOutcome::from_result("list devices", "devices", api.list_devices(params.fields).await)
}

async fn get_device(api: Arc<dyn TailscaleApi>, params: DeviceParams) -> ToolOutcome {
    ToolOutcome::from_result(
        "get device",
        "device",
        api.get_device(&params.device_id, params.fields).await,
    )
}

async fn delete_device(api: Arc<dyn TailscaleApi>, params: DeviceIdParams) -> ToolOutcome {
    let result = api.delete_device(&params.device_id).await;
    ToolOutcome::confirm("delete device", result, || {
        format!("Device {} deleted successfully", params.device_id)
    })
}

async fn authorize_device(api: Arc<dyn TailscaleApi>, params: AuthorizeParams) -> ToolOutcome {
    let result = api
        .set_device_authorized(&params.device_id, params.authorized)
        .await;
    let status = if params.authorized {
        "authorized"
    } else {
        "deauthorized"
    };
    ToolOutcome::confirm("set device authorization", result, || {
        format!("Device {} {} successfully", params.device_id, status)
    })
}

async fn set_device_name(api: Arc<dyn TailscaleApi>, params: SetNameParams) -> ToolOutcome {
    let result = api.set_device_name(&params.device_id, &params.name).await;
    ToolOutcome::confirm("set device name", result, || {
        format!("Device {} name set to {}", params.device_id, params.name)
    })
}

async fn set_device_tags(api: Arc<dyn TailscaleApi>, params: SetTagsParams) -> ToolOutcome {
    let result = api.set_device_tags(&params.device_id, &params.tags).await;
    ToolOutcome::confirm("set device tags", result, || {
        format!("Device {} tags set to {:?}", params.device_id, params.tags)
    })
}

/// The API has no dedicated expiry call; clearing `keyExpiryDisabled`
/// puts the device key back under normal expiry.
async fn expire_device(api: Arc<dyn TailscaleApi>, params: DeviceIdParams) -> ToolOutcome {
    let key = DeviceKey {
        key_expiry_disabled: false,
    };
    let result = api.set_device_key(&params.device_id, key).await;
    ToolOutcome::confirm("set device key expiry", result, || {
        format!("Device {} expired successfully", params.device_id)
    })
}

async fn list_device_routes(api: Arc<dyn TailscaleApi>, params: DeviceIdParams) -> ToolOutcome {
    ToolOutcome::from_result(
        "list device routes",
        "routes",
        api.device_routes(&params.device_id).await,
    )
}

async fn set_device_routes(api: Arc<dyn TailscaleApi>, params: SetRoutesParams) -> ToolOutcome {
    let result = api.set_device_routes(&params.device_id, &params.routes).await;
    ToolOutcome::confirm("set device routes", result, || {
        format!("Device {} routes set to {:?}", params.device_id, params.routes)
    })
}

// ============================================================================
// Tool Definitions
// ============================================================================

fn device_id(description: &'static str) -> ParamSpec {
    ParamSpec::string("device_id", description).required()
}

/// Device tools, in registration order.
pub fn catalog() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_devices_list",
                "List all devices in the tailnet. Returns name, IP addresses, machine and node keys, \
                 and basic connectivity status for each device. Request 'all' fields for OS version, \
                 last-seen time and advanced networking details. OAuth Scope: devices:read.",
            )
            .param(fields_param()),
            list_devices,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_get",
                "Get detailed information about one device: hardware, network configuration, \
                 authentication status and connectivity. Request 'all' fields for OS version, \
                 last-seen time and advanced networking details. OAuth Scope: devices:read.",
            )
            .param(device_id("The device ID"))
            .param(fields_param()),
            get_device,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_delete",
                "Remove a device from the tailnet permanently. This cannot be undone; the device \
                 loses access and must be re-added with a new auth key to rejoin. \
                 OAuth Scope: devices:write.",
            )
            .param(device_id("The device ID to delete")),
            delete_device,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_authorize",
                "Authorize or deauthorize a device in tailnets that require device authorization. \
                 authorized=false revokes access while keeping the device in the tailnet. \
                 OAuth Scope: devices:core.",
            )
            .param(device_id("The device ID"))
            .param(
                ParamSpec::boolean(
                    "authorized",
                    "Whether to authorize (true) or deauthorize (false) the device",
                )
                .required(),
            ),
            authorize_device,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_set_name",
                "Set the machine name of a device. This is the canonical name used across the \
                 tailnet and in MagicDNS; existing MagicDNS URLs using the old name stop working \
                 immediately. Accepts an FQDN or a base name; an empty name resets to the OS \
                 hostname. OAuth Scope: devices:core.",
            )
            .param(device_id("The device ID"))
            .param(ParamSpec::string("name", "The new name for the device").required()),
            set_device_name,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_set_tags",
                "Replace the tags on a device, giving it a non-human identity for ACL-based access \
                 control. Tags must be defined in the tailnet policy file with proper owners. \
                 OAuth Scope: devices:core.",
            )
            .param(device_id("The device ID"))
            .param(
                ParamSpec::string_array("tags", "Array of tags to set on the device").required(),
            ),
            set_device_tags,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_expire",
                "Expire a device's node key so it must re-authenticate to keep tailnet access. \
                 OAuth Scope: devices:core.",
            )
            .param(device_id("The device ID to expire")),
            expire_device,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_routes_list",
                "List the subnet routes a device advertises and the ones enabled for it. A route \
                 must be both advertised and enabled to be used. OAuth Scope: devices:routes:read.",
            )
            .param(device_id("The device ID")),
            list_device_routes,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_device_routes_set",
                "Replace the enabled subnet routes of a device, e.g. ['10.0.0.0/16', \
                 '192.168.1.0/24']. Advertised routes are configured on the device itself. \
                 OAuth Scope: devices:routes.",
            )
            .param(device_id("The device ID"))
            .param(ParamSpec::string_array("routes", "Array of routes to set").required()),
            set_device_routes,
        ),
    ]
}
