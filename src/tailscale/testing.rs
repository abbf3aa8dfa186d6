//! Recording stand-in for the remote API, used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::api::TailscaleApi;
use super::error::{ApiError, ApiResult};
use super::types::{
    ContactType, CreateKeyRequest, CreatePostureIntegrationRequest, CreateWebhookRequest,
    DeviceKey, DnsPreferences, FieldSet, LogType, Record, UpdateContactRequest,
    UpdateTailnetSettingsRequest,
};

/// One call made against the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub args: Value,
}

enum Behaviour {
    Succeed,
    Fail { status: u16, message: String },
    Stall,
}

/// In-memory [`TailscaleApi`] that records every call.
pub struct MockApi {
    behaviour: Behaviour,
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<HashMap<&'static str, Value>>,
}

impl MockApi {
    /// Every call succeeds with a canned response.
    pub fn new() -> Self {
        Self::with_behaviour(Behaviour::Succeed)
    }

    /// Every call fails with the given HTTP status and API message.
    pub fn failing(status: u16, message: &str) -> Self {
        Self::with_behaviour(Behaviour::Fail {
            status,
            message: message.to_string(),
        })
    }

    /// Every call is recorded and then never completes.
    pub fn stalled() -> Self {
        Self::with_behaviour(Behaviour::Stall)
    }

    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(HashMap::new()),
        }
    }

    /// Override the response returned by `method`.
    pub fn respond_with(self, method: &'static str, value: Value) -> Self {
        self.responses.lock().unwrap().insert(method, value);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|c| c.method).collect()
    }

    async fn record(&self, method: &'static str, args: Value) -> ApiResult<()> {
        self.calls.lock().unwrap().push(RecordedCall { method, args });
        match &self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail { status, message } => Err(ApiError::Status {
                status: *status,
                message: message.clone(),
            }),
            Behaviour::Stall => std::future::pending().await,
        }
    }

    fn respond<T: DeserializeOwned>(&self, method: &'static str, fallback: Value) -> ApiResult<T> {
        let value = self
            .responses
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or(fallback);
        serde_json::from_value(value).map_err(|e| ApiError::decode(e.to_string()))
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_device(id: &str) -> Value {
    json!({
        "id": id,
        "name": "host.example.ts.net",
        "addresses": ["100.64.0.1"],
        "authorized": true
    })
}

#[async_trait]
impl TailscaleApi for MockApi {
    async fn list_devices(&self, fields: FieldSet) -> ApiResult<Vec<Record>> {
        self.record("list_devices", json!({ "fields": fields })).await?;
        self.respond("list_devices", json!([sample_device("d-1")]))
    }

    async fn get_device(&self, device_id: &str, fields: FieldSet) -> ApiResult<Record> {
        self.record("get_device", json!({ "device_id": device_id, "fields": fields }))
            .await?;
        self.respond("get_device", sample_device(device_id))
    }

    async fn delete_device(&self, device_id: &str) -> ApiResult<()> {
        self.record("delete_device", json!({ "device_id": device_id }))
            .await
    }

    async fn set_device_authorized(&self, device_id: &str, authorized: bool) -> ApiResult<()> {
        self.record(
            "set_device_authorized",
            json!({ "device_id": device_id, "authorized": authorized }),
        )
        .await
    }

    async fn set_device_name(&self, device_id: &str, name: &str) -> ApiResult<()> {
        self.record("set_device_name", json!({ "device_id": device_id, "name": name }))
            .await
    }

    async fn set_device_tags(&self, device_id: &str, tags: &[String]) -> ApiResult<()> {
        self.record("set_device_tags", json!({ "device_id": device_id, "tags": tags }))
            .await
    }

    async fn set_device_key(&self, device_id: &str, key: DeviceKey) -> ApiResult<()> {
        self.record("set_device_key", json!({ "device_id": device_id, "key": key }))
            .await
    }

    async fn device_routes(&self, device_id: &str) -> ApiResult<Record> {
        self.record("device_routes", json!({ "device_id": device_id }))
            .await?;
        self.respond(
            "device_routes",
            json!({ "advertisedRoutes": ["10.0.0.0/16"], "enabledRoutes": [] }),
        )
    }

    async fn set_device_routes(&self, device_id: &str, routes: &[String]) -> ApiResult<()> {
        self.record("set_device_routes", json!({ "device_id": device_id, "routes": routes }))
            .await
    }

    async fn list_keys(&self, all: bool) -> ApiResult<Vec<Record>> {
        self.record("list_keys", json!({ "all": all })).await?;
        self.respond("list_keys", json!([{ "id": "k-1" }]))
    }

    async fn get_key(&self, key_id: &str) -> ApiResult<Record> {
        self.record("get_key", json!({ "key_id": key_id })).await?;
        self.respond("get_key", json!({ "id": key_id }))
    }

    async fn create_key(&self, request: &CreateKeyRequest) -> ApiResult<Record> {
        self.record("create_key", json!(request)).await?;
        self.respond(
            "create_key",
            json!({
                "id": "k-new",
                "key": "tskey-auth-k-new",
                "capabilities": request.capabilities
            }),
        )
    }

    async fn delete_key(&self, key_id: &str) -> ApiResult<()> {
        self.record("delete_key", json!({ "key_id": key_id })).await
    }

    async fn list_users(&self) -> ApiResult<Vec<Record>> {
        self.record("list_users", Value::Null).await?;
        self.respond("list_users", json!([{ "id": "u-1", "loginName": "amelie@example.com" }]))
    }

    async fn get_user(&self, user_id: &str) -> ApiResult<Record> {
        self.record("get_user", json!({ "user_id": user_id })).await?;
        self.respond("get_user", json!({ "id": user_id }))
    }

    async fn contacts(&self) -> ApiResult<Record> {
        self.record("contacts", Value::Null).await?;
        self.respond(
            "contacts",
            json!({ "account": { "email": "billing@example.com" } }),
        )
    }

    async fn update_contact(
        &self,
        contact_type: ContactType,
        request: &UpdateContactRequest,
    ) -> ApiResult<()> {
        self.record(
            "update_contact",
            json!({ "contact_type": contact_type, "request": request }),
        )
        .await
    }

    async fn nameservers(&self) -> ApiResult<Vec<String>> {
        self.record("nameservers", Value::Null).await?;
        self.respond("nameservers", json!(["8.8.8.8"]))
    }

    async fn set_nameservers(&self, nameservers: &[String]) -> ApiResult<()> {
        self.record("set_nameservers", json!({ "nameservers": nameservers }))
            .await
    }

    async fn dns_preferences(&self) -> ApiResult<DnsPreferences> {
        self.record("dns_preferences", Value::Null).await?;
        self.respond("dns_preferences", json!({ "magicDNS": true }))
    }

    async fn set_dns_preferences(&self, preferences: DnsPreferences) -> ApiResult<()> {
        self.record("set_dns_preferences", json!(preferences)).await
    }

    async fn search_paths(&self) -> ApiResult<Vec<String>> {
        self.record("search_paths", Value::Null).await?;
        self.respond("search_paths", json!(["corp.example.com"]))
    }

    async fn set_search_paths(&self, search_paths: &[String]) -> ApiResult<()> {
        self.record("set_search_paths", json!({ "search_paths": search_paths }))
            .await
    }

    async fn raw_policy(&self) -> ApiResult<String> {
        self.record("raw_policy", Value::Null).await?;
        self.respond(
            "raw_policy",
            json!("// policy\n{\"acls\": [{\"action\": \"accept\", \"src\": [\"*\"], \"dst\": [\"*:*\"]}]}"),
        )
    }

    async fn set_policy(&self, policy: &str) -> ApiResult<()> {
        self.record("set_policy", json!({ "policy": policy })).await
    }

    async fn validate_policy(&self, policy: &str) -> ApiResult<()> {
        self.record("validate_policy", json!({ "policy": policy }))
            .await
    }

    async fn list_webhooks(&self) -> ApiResult<Vec<Record>> {
        self.record("list_webhooks", Value::Null).await?;
        self.respond("list_webhooks", json!([]))
    }

    async fn create_webhook(&self, request: &CreateWebhookRequest) -> ApiResult<Record> {
        self.record("create_webhook", json!(request)).await?;
        self.respond(
            "create_webhook",
            json!({ "endpointId": "w-1", "endpointUrl": request.endpoint_url }),
        )
    }

    async fn get_webhook(&self, endpoint_id: &str) -> ApiResult<Record> {
        self.record("get_webhook", json!({ "endpoint_id": endpoint_id }))
            .await?;
        self.respond("get_webhook", json!({ "endpointId": endpoint_id }))
    }

    async fn delete_webhook(&self, endpoint_id: &str) -> ApiResult<()> {
        self.record("delete_webhook", json!({ "endpoint_id": endpoint_id }))
            .await
    }

    async fn logstream_configuration(&self, log_type: LogType) -> ApiResult<Record> {
        self.record("logstream_configuration", json!({ "log_type": log_type }))
            .await?;
        self.respond(
            "logstream_configuration",
            json!({ "logType": log_type.as_str(), "destinationType": "splunk" }),
        )
    }

    async fn list_posture_integrations(&self) -> ApiResult<Vec<Record>> {
        self.record("list_posture_integrations", Value::Null).await?;
        self.respond("list_posture_integrations", json!([]))
    }

    async fn create_posture_integration(
        &self,
        request: &CreatePostureIntegrationRequest,
    ) -> ApiResult<Record> {
        self.record("create_posture_integration", json!(request))
            .await?;
        self.respond(
            "create_posture_integration",
            json!({ "id": "p-1", "provider": request.provider }),
        )
    }

    async fn get_posture_integration(&self, id: &str) -> ApiResult<Record> {
        self.record("get_posture_integration", json!({ "id": id }))
            .await?;
        self.respond("get_posture_integration", json!({ "id": id }))
    }

    async fn delete_posture_integration(&self, id: &str) -> ApiResult<()> {
        self.record("delete_posture_integration", json!({ "id": id }))
            .await
    }

    async fn tailnet_settings(&self) -> ApiResult<Record> {
        self.record("tailnet_settings", Value::Null).await?;
        self.respond(
            "tailnet_settings",
            json!({ "devicesApprovalOn": false, "regionalRoutingOn": true }),
        )
    }

    async fn update_tailnet_settings(
        &self,
        request: &UpdateTailnetSettingsRequest,
    ) -> ApiResult<()> {
        self.record("update_tailnet_settings", json!(request)).await
    }
}

/// One HTTP request received by a [`StandInServer`].
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl SeenRequest {
    /// Decoded `application/x-www-form-urlencoded` body.
    pub fn form(&self) -> HashMap<String, String> {
        reqwest::Url::parse(&format!("http://form.invalid/?{}", self.body))
            .unwrap()
            .query_pairs()
            .into_owned()
            .collect()
    }
}

type Responder = dyn Fn(&SeenRequest) -> (u16, String) + Send + Sync;

/// Local HTTP server answering in place of the Tailscale API.
///
/// Every request is recorded, then answered by the `respond` closure with a
/// status code and a JSON body.
pub struct StandInServer {
    base_url: String,
    seen: std::sync::Arc<Mutex<Vec<SeenRequest>>>,
    task: tokio::task::JoinHandle<()>,
}

impl StandInServer {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&SeenRequest) -> (u16, String) + Send + Sync + 'static,
    {
        use axum::http::{StatusCode, header};
        use std::sync::Arc;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let app = axum::Router::new().fallback({
            let seen = seen.clone();
            move |request: axum::extract::Request| {
                let seen = seen.clone();
                let respond = respond.clone();
                async move {
                    let (parts, body) = request.into_parts();
                    let body = axum::body::to_bytes(body, usize::MAX)
                        .await
                        .unwrap_or_default();
                    let request = SeenRequest {
                        method: parts.method.to_string(),
                        path: parts.uri.path().to_string(),
                        query: parts.uri.query().map(str::to_string),
                        authorization: parts
                            .headers
                            .get(header::AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string),
                        body: String::from_utf8_lossy(&body).into_owned(),
                    };
                    let (status, body) = respond(&request);
                    seen.lock().unwrap().push(request);
                    (
                        StatusCode::from_u16(status).unwrap(),
                        [(header::CONTENT_TYPE, "application/json")],
                        body,
                    )
                }
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            seen,
            task,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<SeenRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for StandInServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
