//! OAuth client-credentials token source.
//!
//! Tokens are fetched lazily on first use and cached until shortly before
//! they expire. Concurrent callers share a single refresh.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::{ApiError, ApiResult};

/// Scopes requested for every token.
pub const DEFAULT_SCOPES: &[&str] = &["all:read", "all:write"];

/// Refresh this long before the advertised expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) < self.expires_at
    }
}

/// Issues bearer tokens for the configured OAuth client.
pub struct OAuthTokenSource {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scopes: Vec<String>,
    cached: Mutex<Option<CachedToken>>,
}

impl OAuthTokenSource {
    pub fn new(
        http: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            cached: Mutex::new(None),
        }
    }

    /// Space-separated scope string sent to the token endpoint.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    /// Return a valid access token, refreshing it if needed.
    pub async fn token(&self) -> ApiResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
            debug!("OAuth token expired or about to expire, refreshing");
        }

        let token = self.fetch().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn fetch(&self) -> ApiResult<CachedToken> {
        let scope = self.scope();
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::token(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::token(format!("malformed token response: {}", e)))?;
        let lifetime = parsed.expires_in.unwrap_or(3600);

        info!("Obtained OAuth access token (expires in {}s)", lifetime);

        Ok(CachedToken {
            access_token: parsed.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        })
    }
}

impl std::fmt::Debug for OAuthTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokenSource")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tailscale::testing::StandInServer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_scope_is_read_write() {
        let source = OAuthTokenSource::new(
            reqwest::Client::new(),
            "https://example.invalid/oauth/token",
            "id",
            "secret",
        );
        assert_eq!(source.scope(), "all:read all:write");
    }

    #[test]
    fn test_token_freshness_honours_skew() {
        let now = Utc::now();
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::seconds(EXPIRY_SKEW_SECS + 30),
        };
        assert!(token.is_fresh(now));

        let nearly_expired = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::seconds(EXPIRY_SKEW_SECS - 1),
        };
        assert!(!nearly_expired.is_fresh(now));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let source = OAuthTokenSource::new(
            reqwest::Client::new(),
            "https://example.invalid/oauth/token",
            "id",
            "hunter2",
        );
        let debug = format!("{:?}", source);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    fn source(server: &StandInServer) -> OAuthTokenSource {
        OAuthTokenSource::new(
            reqwest::Client::new(),
            format!("{}/api/v2/oauth/token", server.base_url()),
            "cid",
            "csecret",
        )
    }

    #[tokio::test]
    async fn test_short_lived_token_is_refreshed() {
        let issued = AtomicUsize::new(0);
        let server = StandInServer::start(move |_| {
            let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
            (
                200,
                serde_json::json!({ "access_token": format!("tok-{}", n), "expires_in": 30 })
                    .to_string(),
            )
        })
        .await;
        let source = source(&server);

        assert_eq!(source.token().await.unwrap(), "tok-1");
        assert_eq!(source.token().await.unwrap(), "tok-2");

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.method == "POST"));
        assert_eq!(requests[0].form()["client_secret"], "csecret");
    }

    #[tokio::test]
    async fn test_long_lived_token_is_cached() {
        let server = StandInServer::start(|_| {
            (
                200,
                r#"{"access_token":"tok-cached","expires_in":3600}"#.to_string(),
            )
        })
        .await;
        let source = source(&server);

        for _ in 0..3 {
            assert_eq!(source.token().await.unwrap(), "tok-cached");
        }
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_token_endpoint_refusal() {
        let server =
            StandInServer::start(|_| (401, r#"{"message":"invalid client"}"#.to_string())).await;
        let source = source(&server);

        let err = source.token().await.unwrap_err();
        assert!(matches!(err, ApiError::Token(_)));
        assert!(err.to_string().contains("HTTP 401"));
    }
}
