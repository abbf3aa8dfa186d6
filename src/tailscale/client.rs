//! HTTPS client for the Tailscale v2 API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::api::TailscaleApi;
use super::error::{ApiError, ApiResult, ClientError};
use super::oauth::OAuthTokenSource;
use super::types::{
    ContactType, CreateKeyRequest, CreatePostureIntegrationRequest, CreateWebhookRequest,
    DeviceKey, DnsPreferences, FieldSet, LogType, Record, UpdateContactRequest,
    UpdateTailnetSettingsRequest,
};
use crate::core::credentials::{AuthMode, Credentials};

const HUJSON: &str = "application/hujson";
const USER_AGENT: &str = concat!("tailnet-mcp-server/", env!("CARGO_PKG_VERSION"));

enum Authorization {
    ApiKey(String),
    OAuth(OAuthTokenSource),
}

/// reqwest-backed implementation of [`TailscaleApi`].
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    tailnet: String,
    auth: Authorization,
}

impl HttpClient {
    /// Build a client for `base_url` (e.g. `https://api.tailscale.com`).
    pub fn new(
        credentials: &Credentials,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Build(format!("invalid base URL {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Build(format!(
                "base URL {} cannot carry a path",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        let auth = match &credentials.mode {
            AuthMode::ApiKey(key) => Authorization::ApiKey(key.clone()),
            AuthMode::OAuth {
                client_id,
                client_secret,
            } => {
                let mut token_url = base_url.clone();
                push_segments(&mut token_url, &["api", "v2", "oauth", "token"])
                    .map_err(|e| ClientError::Build(e.to_string()))?;
                Authorization::OAuth(OAuthTokenSource::new(
                    http.clone(),
                    token_url.as_str(),
                    client_id.clone(),
                    client_secret.clone(),
                ))
            }
        };

        Ok(Self {
            http,
            base_url,
            tailnet: credentials.tailnet.clone(),
            auth,
        })
    }

    /// `{base}/api/v2/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        push_segments(&mut url, &["api", "v2"])?;
        push_segments(&mut url, segments)?;
        Ok(url)
    }

    /// `{base}/api/v2/tailnet/{tailnet}/{segments...}`.
    fn tailnet_endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut all = vec!["tailnet", self.tailnet.as_str()];
        all.extend_from_slice(segments);
        self.endpoint(&all)
    }

    async fn authorize(&self, builder: RequestBuilder) -> ApiResult<RequestBuilder> {
        Ok(match &self.auth {
            Authorization::ApiKey(key) => builder.basic_auth(key, None::<&str>),
            Authorization::OAuth(source) => builder.bearer_auth(source.token().await?),
        })
    }

    /// Send a request and turn non-2xx answers into [`ApiError::Status`].
    async fn execute(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = self.authorize(builder).await?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        debug!(%url, "GET");
        let response = self.execute(self.http.get(url)).await?;
        decode(response).await
    }

    /// GET an envelope such as `{"devices": [...]}` and return the named member.
    async fn get_member<T: DeserializeOwned>(&self, url: Url, member: &str) -> ApiResult<T> {
        let mut envelope: Value = self.get_json(url).await?;
        let inner = envelope
            .get_mut(member)
            .map(Value::take)
            .unwrap_or(Value::Null);
        let inner = if inner.is_null() { json!([]) } else { inner };
        serde_json::from_value(inner)
            .map_err(|e| ApiError::decode(format!("field `{}`: {}", member, e)))
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> ApiResult<Response> {
        debug!(%url, %method, "sending JSON body");
        self.execute(self.http.request(method, url).json(body)).await
    }

    async fn delete(&self, url: Url) -> ApiResult<()> {
        debug!(%url, "DELETE");
        self.execute(self.http.delete(url)).await.map(drop)
    }
}

fn push_segments(url: &mut Url, segments: &[&str]) -> ApiResult<()> {
    url.path_segments_mut()
        .map_err(|_| ApiError::decode("base URL cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::decode(e.to_string()))
}

fn with_fields(mut url: Url, fields: FieldSet) -> Url {
    if let Some(value) = fields.as_query() {
        url.query_pairs_mut().append_pair("fields", value);
    }
    url
}

#[async_trait]
impl TailscaleApi for HttpClient {
    #[instrument(skip(self))]
    async fn list_devices(&self, fields: FieldSet) -> ApiResult<Vec<Record>> {
        let url = with_fields(self.tailnet_endpoint(&["devices"])?, fields);
        self.get_member(url, "devices").await
    }

    #[instrument(skip(self))]
    async fn get_device(&self, device_id: &str, fields: FieldSet) -> ApiResult<Record> {
        let url = with_fields(self.endpoint(&["device", device_id])?, fields);
        self.get_json(url).await
    }

    async fn delete_device(&self, device_id: &str) -> ApiResult<()> {
        self.delete(self.endpoint(&["device", device_id])?).await
    }

    async fn set_device_authorized(&self, device_id: &str, authorized: bool) -> ApiResult<()> {
        let url = self.endpoint(&["device", device_id, "authorized"])?;
        self.send_json(Method::POST, url, &json!({ "authorized": authorized }))
            .await
            .map(drop)
    }

    async fn set_device_name(&self, device_id: &str, name: &str) -> ApiResult<()> {
        let url = self.endpoint(&["device", device_id, "name"])?;
        self.send_json(Method::POST, url, &json!({ "name": name }))
            .await
            .map(drop)
    }

    async fn set_device_tags(&self, device_id: &str, tags: &[String]) -> ApiResult<()> {
        let url = self.endpoint(&["device", device_id, "tags"])?;
        self.send_json(Method::POST, url, &json!({ "tags": tags }))
            .await
            .map(drop)
    }

    async fn set_device_key(&self, device_id: &str, key: DeviceKey) -> ApiResult<()> {
        let url = self.endpoint(&["device", device_id, "key"])?;
        self.send_json(Method::POST, url, &key).await.map(drop)
    }

    async fn device_routes(&self, device_id: &str) -> ApiResult<Record> {
        self.get_json(self.endpoint(&["device", device_id, "routes"])?)
            .await
    }

    async fn set_device_routes(&self, device_id: &str, routes: &[String]) -> ApiResult<()> {
        let url = self.endpoint(&["device", device_id, "routes"])?;
        self.send_json(Method::POST, url, &json!({ "routes": routes }))
            .await
            .map(drop)
    }

    async fn list_keys(&self, all: bool) -> ApiResult<Vec<Record>> {
        let mut url = self.tailnet_endpoint(&["keys"])?;
        if all {
            url.query_pairs_mut().append_pair("all", "true");
        }
        self.get_member(url, "keys").await
    }

    async fn get_key(&self, key_id: &str) -> ApiResult<Record> {
        self.get_json(self.tailnet_endpoint(&["keys", key_id])?)
            .await
    }

    #[instrument(skip(self, request))]
    async fn create_key(&self, request: &CreateKeyRequest) -> ApiResult<Record> {
        let url = self.tailnet_endpoint(&["keys"])?;
        let response = self.send_json(Method::POST, url, request).await?;
        decode(response).await
    }

    async fn delete_key(&self, key_id: &str) -> ApiResult<()> {
        self.delete(self.tailnet_endpoint(&["keys", key_id])?).await
    }

    async fn list_users(&self) -> ApiResult<Vec<Record>> {
        self.get_member(self.tailnet_endpoint(&["users"])?, "users")
            .await
    }

    async fn get_user(&self, user_id: &str) -> ApiResult<Record> {
        self.get_json(self.endpoint(&["users", user_id])?).await
    }

    async fn contacts(&self) -> ApiResult<Record> {
        self.get_json(self.tailnet_endpoint(&["contacts"])?).await
    }

    async fn update_contact(
        &self,
        contact_type: ContactType,
        request: &UpdateContactRequest,
    ) -> ApiResult<()> {
        let url = self.tailnet_endpoint(&["contacts", contact_type.as_str()])?;
        self.send_json(Method::PATCH, url, request).await.map(drop)
    }

    async fn nameservers(&self) -> ApiResult<Vec<String>> {
        self.get_member(self.tailnet_endpoint(&["dns", "nameservers"])?, "dns")
            .await
    }

    async fn set_nameservers(&self, nameservers: &[String]) -> ApiResult<()> {
        let url = self.tailnet_endpoint(&["dns", "nameservers"])?;
        self.send_json(Method::POST, url, &json!({ "dns": nameservers }))
            .await
            .map(drop)
    }

    async fn dns_preferences(&self) -> ApiResult<DnsPreferences> {
        self.get_json(self.tailnet_endpoint(&["dns", "preferences"])?)
            .await
    }

    async fn set_dns_preferences(&self, preferences: DnsPreferences) -> ApiResult<()> {
        let url = self.tailnet_endpoint(&["dns", "preferences"])?;
        self.send_json(Method::POST, url, &preferences)
            .await
            .map(drop)
    }

    async fn search_paths(&self) -> ApiResult<Vec<String>> {
        self.get_member(
            self.tailnet_endpoint(&["dns", "searchpaths"])?,
            "searchPaths",
        )
        .await
    }

    async fn set_search_paths(&self, search_paths: &[String]) -> ApiResult<()> {
        let url = self.tailnet_endpoint(&["dns", "searchpaths"])?;
        self.send_json(Method::POST, url, &json!({ "searchPaths": search_paths }))
            .await
            .map(drop)
    }

    async fn raw_policy(&self) -> ApiResult<String> {
        let url = self.tailnet_endpoint(&["acl"])?;
        let response = self
            .execute(self.http.get(url).header(ACCEPT, HUJSON))
            .await?;
        Ok(response.text().await?)
    }

    async fn set_policy(&self, policy: &str) -> ApiResult<()> {
        let url = self.tailnet_endpoint(&["acl"])?;
        self.execute(
            self.http
                .post(url)
                .header(CONTENT_TYPE, HUJSON)
                .body(policy.to_string()),
        )
        .await
        .map(drop)
    }

    async fn validate_policy(&self, policy: &str) -> ApiResult<()> {
        let url = self.tailnet_endpoint(&["acl", "validate"])?;
        let response = self
            .execute(
                self.http
                    .post(url)
                    .header(CONTENT_TYPE, HUJSON)
                    .body(policy.to_string()),
            )
            .await?;

        // A 200 may still carry a rejection message describing the problem.
        let body = response.text().await?;
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .filter(|m| !m.is_empty());
        match message {
            Some(message) => Err(ApiError::Rejected(message)),
            None => Ok(()),
        }
    }

    async fn list_webhooks(&self) -> ApiResult<Vec<Record>> {
        self.get_member(self.tailnet_endpoint(&["webhooks"])?, "webhooks")
            .await
    }

    async fn create_webhook(&self, request: &CreateWebhookRequest) -> ApiResult<Record> {
        let url = self.tailnet_endpoint(&["webhooks"])?;
        let response = self.send_json(Method::POST, url, request).await?;
        decode(response).await
    }

    async fn get_webhook(&self, endpoint_id: &str) -> ApiResult<Record> {
        self.get_json(self.endpoint(&["webhooks", endpoint_id])?)
            .await
    }

    async fn delete_webhook(&self, endpoint_id: &str) -> ApiResult<()> {
        self.delete(self.endpoint(&["webhooks", endpoint_id])?)
            .await
    }

    async fn logstream_configuration(&self, log_type: LogType) -> ApiResult<Record> {
        let url = self.tailnet_endpoint(&["logging", log_type.as_str(), "stream"])?;
        self.get_json(url).await
    }

    async fn list_posture_integrations(&self) -> ApiResult<Vec<Record>> {
        let url = self.tailnet_endpoint(&["posture", "integrations"])?;
        self.get_member(url, "integrations").await
    }

    async fn create_posture_integration(
        &self,
        request: &CreatePostureIntegrationRequest,
    ) -> ApiResult<Record> {
        let url = self.tailnet_endpoint(&["posture", "integrations"])?;
        let response = self.send_json(Method::POST, url, request).await?;
        decode(response).await
    }

    async fn get_posture_integration(&self, id: &str) -> ApiResult<Record> {
        self.get_json(self.endpoint(&["posture", "integrations", id])?)
            .await
    }

    async fn delete_posture_integration(&self, id: &str) -> ApiResult<()> {
        self.delete(self.endpoint(&["posture", "integrations", id])?)
            .await
    }

    async fn tailnet_settings(&self) -> ApiResult<Record> {
        self.get_json(self.tailnet_endpoint(&["settings"])?).await
    }

    async fn update_tailnet_settings(
        &self,
        request: &UpdateTailnetSettingsRequest,
    ) -> ApiResult<()> {
        let url = self.tailnet_endpoint(&["settings"])?;
        self.send_json(Method::PATCH, url, request).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tailscale::testing::{SeenRequest, StandInServer};

    fn client(tailnet: &str, base: &str) -> HttpClient {
        let credentials = Credentials {
            tailnet: tailnet.to_string(),
            mode: AuthMode::ApiKey("tskey-api-test".to_string()),
        };
        HttpClient::new(&credentials, base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_tailnet_endpoint_paths() {
        let client = client("-", "https://api.tailscale.com");
        assert_eq!(
            client.tailnet_endpoint(&["devices"]).unwrap().as_str(),
            "https://api.tailscale.com/api/v2/tailnet/-/devices"
        );
        assert_eq!(
            client
                .tailnet_endpoint(&["logging", LogType::Network.as_str(), "stream"])
                .unwrap()
                .as_str(),
            "https://api.tailscale.com/api/v2/tailnet/-/logging/network/stream"
        );
    }

    #[test]
    fn test_segments_are_escaped() {
        let client = client("example.com", "https://api.tailscale.com/");
        let url = client.endpoint(&["device", "weird/id?x"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.tailscale.com/api/v2/device/weird%2Fid%3Fx"
        );
    }

    #[test]
    fn test_fields_query_only_for_all() {
        let client = client("-", "https://api.tailscale.com");
        let base = client.tailnet_endpoint(&["devices"]).unwrap();
        assert_eq!(with_fields(base.clone(), FieldSet::Default).query(), None);
        assert_eq!(with_fields(base, FieldSet::All).query(), Some("fields=all"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let credentials = Credentials {
            tailnet: "-".to_string(),
            mode: AuthMode::ApiKey("k".to_string()),
        };
        let err = HttpClient::new(&credentials, "not a url", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Build(_)));
    }

    #[test]
    fn test_oauth_mode_builds_token_source() {
        let credentials = Credentials {
            tailnet: "-".to_string(),
            mode: AuthMode::OAuth {
                client_id: "cid".to_string(),
                client_secret: "secret".to_string(),
            },
        };
        let client =
            HttpClient::new(&credentials, "https://api.tailscale.com", Duration::from_secs(1))
                .unwrap();
        assert!(matches!(client.auth, Authorization::OAuth(_)));
    }

    fn respond(request: &SeenRequest) -> (u16, String) {
        match (request.method.as_str(), request.path.as_str()) {
            ("POST", "/api/v2/oauth/token") => (
                200,
                json!({ "access_token": "tok-1", "expires_in": 3600 }).to_string(),
            ),
            ("GET", "/api/v2/tailnet/-/devices") => {
                (200, json!({ "devices": [{ "id": "d-1" }] }).to_string())
            }
            ("GET", "/api/v2/tailnet/-/users") => (200, json!({ "users": null }).to_string()),
            ("GET", "/api/v2/device/d-404") => {
                (404, json!({ "message": "device not found" }).to_string())
            }
            ("POST", "/api/v2/tailnet/-/acl/validate") if request.body.contains("bad") => (
                200,
                json!({ "message": "line 3: unknown field" }).to_string(),
            ),
            ("POST", "/api/v2/tailnet/-/acl/validate") => (200, "{}".to_string()),
            _ => (500, "unexpected request".to_string()),
        }
    }

    #[tokio::test]
    async fn test_api_key_sent_as_basic_auth() {
        let server = StandInServer::start(respond).await;
        let client = client("-", server.base_url());

        let devices = client.list_devices(FieldSet::All).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0]["id"], "d-1");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query.as_deref(), Some("fields=all"));
        // base64("tskey-api-test:")
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Basic dHNrZXktYXBpLXRlc3Q6")
        );
    }

    #[tokio::test]
    async fn test_null_envelope_member_is_empty_list() {
        let server = StandInServer::start(respond).await;
        let client = client("-", server.base_url());

        let users = client.list_users().await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_carries_api_message() {
        let server = StandInServer::start(respond).await;
        let client = client("-", server.base_url());

        let err = client
            .get_device("d-404", FieldSet::Default)
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "device not found");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validate_policy_reads_message_from_success_body() {
        let server = StandInServer::start(respond).await;
        let client = client("-", server.base_url());

        client.validate_policy("{\"acls\": []}").await.unwrap();

        let err = client.validate_policy("{ bad }").await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
        assert_eq!(err.to_string(), "line 3: unknown field");
    }

    #[tokio::test]
    async fn test_oauth_bearer_token_fetched_once() {
        let server = StandInServer::start(respond).await;
        let credentials = Credentials {
            tailnet: "-".to_string(),
            mode: AuthMode::OAuth {
                client_id: "cid".to_string(),
                client_secret: "csecret".to_string(),
            },
        };
        let client =
            HttpClient::new(&credentials, server.base_url(), Duration::from_secs(5)).unwrap();

        client.list_devices(FieldSet::Default).await.unwrap();
        client.list_devices(FieldSet::Default).await.unwrap();

        let token_requests = server.requests_to("/api/v2/oauth/token");
        assert_eq!(token_requests.len(), 1);
        let form = token_requests[0].form();
        assert_eq!(form["grant_type"], "client_credentials");
        assert_eq!(form["client_id"], "cid");
        assert_eq!(form["scope"], "all:read all:write");

        let device_requests = server.requests_to("/api/v2/tailnet/-/devices");
        assert_eq!(device_requests.len(), 2);
        assert!(
            device_requests
                .iter()
                .all(|r| r.authorization.as_deref() == Some("Bearer tok-1"))
        );
    }
}
