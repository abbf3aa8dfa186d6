//! The remote management API as seen by the tool handlers.
//!
//! Handlers only ever talk to `dyn TailscaleApi`, which keeps them
//! independent of the HTTP client and lets tests substitute a recording
//! stand-in.

use async_trait::async_trait;

use super::error::ApiResult;
use super::types::{
    ContactType, CreateKeyRequest, CreatePostureIntegrationRequest, CreateWebhookRequest,
    DeviceKey, DnsPreferences, FieldSet, LogType, Record, UpdateContactRequest,
    UpdateTailnetSettingsRequest,
};

/// Operations of the Tailscale v2 API used by the tool catalog.
#[async_trait]
pub trait TailscaleApi: Send + Sync {
    // Devices

    async fn list_devices(&self, fields: FieldSet) -> ApiResult<Vec<Record>>;
    async fn get_device(&self, device_id: &str, fields: FieldSet) -> ApiResult<Record>;
    async fn delete_device(&self, device_id: &str) -> ApiResult<()>;
    async fn set_device_authorized(&self, device_id: &str, authorized: bool) -> ApiResult<()>;
    async fn set_device_name(&self, device_id: &str, name: &str) -> ApiResult<()>;
    async fn set_device_tags(&self, device_id: &str, tags: &[String]) -> ApiResult<()>;
    async fn set_device_key(&self, device_id: &str, key: DeviceKey) -> ApiResult<()>;
    async fn device_routes(&self, device_id: &str) -> ApiResult<Record>;
    async fn set_device_routes(&self, device_id: &str, routes: &[String]) -> ApiResult<()>;

    // Auth keys

    async fn list_keys(&self, all: bool) -> ApiResult<Vec<Record>>;
    async fn get_key(&self, key_id: &str) -> ApiResult<Record>;
    async fn create_key(&self, request: &CreateKeyRequest) -> ApiResult<Record>;
    async fn delete_key(&self, key_id: &str) -> ApiResult<()>;

    // Users and contacts

    async fn list_users(&self) -> ApiResult<Vec<Record>>;
    async fn get_user(&self, user_id: &str) -> ApiResult<Record>;
    async fn contacts(&self) -> ApiResult<Record>;
    async fn update_contact(
        &self,
        contact_type: ContactType,
        request: &UpdateContactRequest,
    ) -> ApiResult<()>;

    // DNS

    async fn nameservers(&self) -> ApiResult<Vec<String>>;
    async fn set_nameservers(&self, nameservers: &[String]) -> ApiResult<()>;
    async fn dns_preferences(&self) -> ApiResult<DnsPreferences>;
    async fn set_dns_preferences(&self, preferences: DnsPreferences) -> ApiResult<()>;
    async fn search_paths(&self) -> ApiResult<Vec<String>>;
    async fn set_search_paths(&self, search_paths: &[String]) -> ApiResult<()>;

    // Policy file

    /// The policy file exactly as stored (HuJSON, comments included).
    async fn raw_policy(&self) -> ApiResult<String>;
    async fn set_policy(&self, policy: &str) -> ApiResult<()>;
    async fn validate_policy(&self, policy: &str) -> ApiResult<()>;

    // Webhooks

    async fn list_webhooks(&self) -> ApiResult<Vec<Record>>;
    async fn create_webhook(&self, request: &CreateWebhookRequest) -> ApiResult<Record>;
    async fn get_webhook(&self, endpoint_id: &str) -> ApiResult<Record>;
    async fn delete_webhook(&self, endpoint_id: &str) -> ApiResult<()>;

    // Logging

    async fn logstream_configuration(&self, log_type: LogType) -> ApiResult<Record>;

    // Device posture

    async fn list_posture_integrations(&self) -> ApiResult<Vec<Record>>;
    async fn create_posture_integration(
        &self,
        request: &CreatePostureIntegrationRequest,
    ) -> ApiResult<Record>;
    async fn get_posture_integration(&self, id: &str) -> ApiResult<Record>;
    async fn delete_posture_integration(&self, id: &str) -> ApiResult<()>;

    // Tailnet settings

    async fn tailnet_settings(&self) -> ApiResult<Record>;
    async fn update_tailnet_settings(&self, request: &UpdateTailnetSettingsRequest) -> ApiResult<()>;
}
