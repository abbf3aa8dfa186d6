//! Request shapes and selectors for the Tailscale v2 API.
//!
//! Response records (devices, keys, users, webhooks, ...) are kept as raw
//! `serde_json::Value`s so that whatever the API returns is echoed back to
//! the MCP client with its own field naming intact. Only the payloads this
//! server constructs are modelled as types.

use serde::{Deserialize, Serialize};

/// A record returned by the remote API, passed through untouched.
pub type Record = serde_json::Value;

/// Which device field set to request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSet {
    /// The standard field set.
    #[default]
    Default,
    /// Every field the API knows about (OS version, last seen, client connectivity, ...).
    All,
}

impl FieldSet {
    /// Query-string value understood by the API, if any.
    pub fn as_query(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::All => Some("all"),
        }
    }
}

/// Key expiry settings for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceKey {
    pub key_expiry_disabled: bool,
}

/// Device-creation capabilities granted by an auth key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCreateCapabilities {
    pub reusable: bool,
    pub ephemeral: bool,
    pub tags: Vec<String>,
    pub preauthorized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub create: DeviceCreateCapabilities,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCapabilities {
    pub devices: DeviceCapabilities,
}

/// Body of `POST /tailnet/{tailnet}/keys`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    pub capabilities: KeyCapabilities,
    /// Omitted when unset so the API applies its own default (90 days).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_seconds: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
}

/// Contact slot in the tailnet's contact preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Account,
    Support,
    Security,
}

impl ContactType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Support => "support",
            Self::Security => "security",
        }
    }
}

impl std::fmt::Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `PATCH /tailnet/{tailnet}/contacts/{type}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateContactRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Tailnet DNS preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsPreferences {
    #[serde(rename = "magicDNS")]
    pub magic_dns: bool,
}

/// Body of `POST /tailnet/{tailnet}/webhooks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookRequest {
    pub endpoint_url: String,
    pub subscriptions: Vec<String>,
}

/// Log stream selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    /// Configuration audit logs.
    Config,
    /// Network flow logs.
    Network,
}

impl LogType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "configuration",
            Self::Network => "network",
        }
    }
}

/// Body of `POST /tailnet/{tailnet}/posture/integrations`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostureIntegrationRequest {
    pub provider: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub tenant_id: String,
}

impl std::fmt::Debug for CreatePostureIntegrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatePostureIntegrationRequest")
            .field("provider", &self.provider)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Body of `PATCH /tailnet/{tailnet}/settings`.
///
/// Every field is optional; only the ones that are set are sent, so the
/// API leaves everything else unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTailnetSettingsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices_approval_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices_auto_updates_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices_key_duration_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_approval_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_role_allowed_to_join_external_tailnets: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_flow_logging_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regional_routing_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posture_identity_collection_on: Option<bool>,
}
