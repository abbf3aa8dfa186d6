//! Auth key tools.

use std::sync::Arc;

use serde::Deserialize;

use super::NoParams;
use crate::domains::tools::outcome::ToolOutcome;
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ParamSpec, ToolSchema};
use crate::tailscale::TailscaleApi;
use crate::tailscale::types::{
    CreateKeyRequest, DeviceCapabilities, DeviceCreateCapabilities, KeyCapabilities,
};

#[derive(Debug, Deserialize)]
pub struct KeyIdParams {
    pub key_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateKeyParams {
    pub reusable: bool,
    pub ephemeral: bool,
    pub preauthorized: bool,
    pub description: String,
    pub tags: Vec<String>,
    /// Lifetime in seconds; zero or negative leaves the API default in place.
    pub expiry_seconds: Option<f64>,
}

impl CreateKeyParams {
    fn into_request(self) -> CreateKeyRequest {
        let expiry_seconds = self
            .expiry_seconds
            .map(|secs| secs as i64)
            .filter(|&secs| secs > 0);

        CreateKeyRequest {
            capabilities: KeyCapabilities {
                devices: DeviceCapabilities {
                    create: DeviceCreateCapabilities {
                        reusable: self.reusable,
                        ephemeral: self.ephemeral,
                        tags: self.tags,
                        preauthorized: self.preauthorized,
                    },
                },
            },
            expiry_seconds,
            description: self.description,
        }
    }
}

async fn list_keys(api: Arc<dyn TailscaleApi>, _: NoParams) -> ToolOutcome {
    ToolOutcome::from_result("list keys", "keys", api.list_keys(false).await)
}

async fn get_key(api: Arc<dyn TailscaleApi>, params: KeyIdParams) -> ToolOutcome {
    ToolOutcome::from_result("get key", "key", api.get_key(&params.key_id).await)
}

async fn create_key(api: Arc<dyn TailscaleApi>, params: CreateKeyParams) -> ToolOutcome {
    let request = params.into_request();
    ToolOutcome::from_result("create key", "key", api.create_key(&request).await)
}

async fn delete_key(api: Arc<dyn TailscaleApi>, params: KeyIdParams) -> ToolOutcome {
    let result = api.delete_key(&params.key_id).await;
    ToolOutcome::confirm("delete key", result, || {
        format!("Key {} deleted successfully", params.key_id)
    })
}

/// Key tools, in registration order.
pub fn catalog() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_keys_list",
                "List the authentication keys of the tailnet, including reusable, ephemeral and \
                 tagged keys, with their expiry, usage and capabilities. OAuth Scope: keys:read.",
            ),
            list_keys,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_key_get",
                "Get one authentication key: capabilities, creation and expiry times, and \
                 associated tags. OAuth Scope: keys:read.",
            )
            .param(ParamSpec::string("key_id", "The key ID").required()),
            get_key,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_key_create",
                "Create an authentication key for onboarding devices. Keys can be reusable \
                 (multiple devices), ephemeral (devices removed when offline) or preauthorized \
                 (no manual approval), carry tags for ACLs, and expire after a set number of \
                 seconds. OAuth Scope: keys:write.",
            )
            .param(
                ParamSpec::boolean("reusable", "Whether the key can be reused").with_default(false),
            )
            .param(
                ParamSpec::boolean(
                    "ephemeral",
                    "Whether devices using this key will be ephemeral",
                )
                .with_default(false),
            )
            .param(
                ParamSpec::boolean(
                    "preauthorized",
                    "Whether devices using this key will be pre-authorized",
                )
                .with_default(false),
            )
            .param(ParamSpec::string("description", "Description of the key"))
            .param(ParamSpec::string_array(
                "tags",
                "Tags to apply to devices using this key",
            ))
            .param(ParamSpec::number(
                "expiry_seconds",
                "Expiry time in seconds from now",
            )),
            create_key,
        ),
        ToolDefinition::new(
            ToolSchema::new(
                "tailscale_key_delete",
                "Delete an authentication key so it can no longer add devices. Devices already \
                 authenticated with it are not affected. OAuth Scope: keys:write.",
            )
            .param(ParamSpec::string("key_id", "The key ID to delete").required()),
            delete_key,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::registry::test_support::{call, registry};
    use crate::tailscale::testing::MockApi;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_create_key_capabilities() {
        let mock = Arc::new(MockApi::new());
        let registry = registry(mock.clone());

        let outcome = call(
            &registry,
            "tailscale_key_create",
            json!({ "reusable": true, "tags": ["tag:ci"] }),
        )
        .await;
        assert!(!outcome.is_error(), "{}", outcome);

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].args,
            json!({
                "capabilities": {
                    "devices": {
                        "create": {
                            "reusable": true,
                            "ephemeral": false,
                            "tags": ["tag:ci"],
                            "preauthorized": false
                        }
                    }
                }
            })
        );

        let text = outcome.to_string();
        assert!(text.starts_with("{\n  \""));
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["id"], "k-new");
    }

    #[tokio::test]
    async fn test_expiry_only_sent_when_positive() {
        let mock = Arc::new(MockApi::new());
        let registry = registry(mock.clone());

        call(&registry, "tailscale_key_create", json!({ "expiry_seconds": 0 })).await;
        call(&registry, "tailscale_key_create", json!({ "expiry_seconds": 3600 })).await;
        call(&registry, "tailscale_key_create", json!({})).await;

        let calls = mock.calls();
        assert!(calls[0].args.get("expirySeconds").is_none());
        assert_eq!(calls[1].args["expirySeconds"], 3600);
        assert!(calls[2].args.get("expirySeconds").is_none());
    }

    #[test]
    fn test_description_passed_through() {
        let request = CreateKeyParams {
            description: "ci runners".into(),
            ..Default::default()
        }
        .into_request();
        assert_eq!(request.description, "ci runners");
        assert!(request.capabilities.devices.create.tags.is_empty());
    }

    #[tokio::test]
    async fn test_list_keys_excludes_other_users() {
        let mock = Arc::new(MockApi::new());
        let registry = registry(mock.clone());

        call(&registry, "tailscale_keys_list", json!({})).await;
        assert_eq!(mock.calls()[0].args, json!({ "all": false }));
    }

    #[tokio::test]
    async fn test_delete_key_confirmation() {
        let mock = Arc::new(MockApi::new());
        let registry = registry(mock.clone());

        let outcome = call(&registry, "tailscale_key_delete", json!({ "key_id": "k-1" })).await;
        assert_eq!(outcome.to_string(), "Key k-1 deleted successfully");
    }
}
