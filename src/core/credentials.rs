//! Credential resolution.
//!
//! Turns the raw Tailscale settings into exactly one authentication mode.
//! Purely local: no network I/O happens here.

use super::config::TailscaleConfig;
use super::error::{Error, Result};

/// Tailnet identifier meaning "the default tailnet of the authenticated caller".
pub const DEFAULT_TAILNET: &str = "-";

/// How requests to the remote API are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Static API key.
    ApiKey(String),

    /// OAuth client-credentials grant.
    OAuth {
        client_id: String,
        client_secret: String,
    },
}

impl AuthMode {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api-key",
            Self::OAuth { .. } => "oauth",
        }
    }
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"[REDACTED]").finish(),
            Self::OAuth { client_id, .. } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Resolved credentials for the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub tailnet: String,
    pub mode: AuthMode,
}

impl Credentials {
    /// Pick the authentication mode.
    ///
    /// OAuth wins when both the client id and secret are non-empty; otherwise
    /// the API key is used. With neither available this is a configuration error.
    pub fn resolve(config: &TailscaleConfig) -> Result<Self> {
        let tailnet = non_empty(config.tailnet.as_deref())
            .unwrap_or(DEFAULT_TAILNET)
            .to_string();

        let oauth = non_empty(config.client_id.as_deref())
            .zip(non_empty(config.client_secret.as_deref()));

        let mode = match (oauth, non_empty(config.api_key.as_deref())) {
            (Some((client_id, client_secret)), _) => AuthMode::OAuth {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            },
            (None, Some(api_key)) => AuthMode::ApiKey(api_key.to_string()),
            (None, None) => {
                return Err(Error::config(
                    "either TAILSCALE_API_KEY or both TAILSCALE_CLIENT_ID and \
                     TAILSCALE_CLIENT_SECRET must be set",
                ));
            }
        };

        Ok(Self { tailnet, mode })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(
        api_key: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> TailscaleConfig {
        TailscaleConfig {
            api_key: api_key.map(str::to_string),
            client_id: client_id.map(str::to_string),
            client_secret: client_secret.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_api_key_only() {
        let creds = Credentials::resolve(&settings(Some("tskey-api"), None, None)).unwrap();
        assert_eq!(creds.mode, AuthMode::ApiKey("tskey-api".to_string()));
    }

    #[test]
    fn test_oauth_only() {
        let creds = Credentials::resolve(&settings(None, Some("cid"), Some("secret"))).unwrap();
        assert!(matches!(creds.mode, AuthMode::OAuth { .. }));
        assert_eq!(creds.mode.label(), "oauth");
    }

    #[test]
    fn test_both_prefers_oauth() {
        let creds =
            Credentials::resolve(&settings(Some("tskey-api"), Some("cid"), Some("secret")))
                .unwrap();
        assert_eq!(
            creds.mode,
            AuthMode::OAuth {
                client_id: "cid".to_string(),
                client_secret: "secret".to_string(),
            }
        );
    }

    #[test]
    fn test_neither_is_config_error() {
        let err = Credentials::resolve(&settings(None, None, None)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("TAILSCALE_API_KEY"));
        assert!(err.to_string().contains("TAILSCALE_CLIENT_ID"));
    }

    #[test]
    fn test_partial_oauth_falls_back_to_api_key() {
        let creds = Credentials::resolve(&settings(Some("tskey-api"), Some("cid"), Some("")))
            .unwrap();
        assert_eq!(creds.mode.label(), "api-key");

        let err = Credentials::resolve(&settings(Some(""), Some("cid"), None)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_tailnet_defaults_to_dash() {
        let creds = Credentials::resolve(&settings(Some("k"), None, None)).unwrap();
        assert_eq!(creds.tailnet, DEFAULT_TAILNET);

        let mut with_tailnet = settings(Some("k"), None, None);
        with_tailnet.tailnet = Some("example.com".to_string());
        assert_eq!(Credentials::resolve(&with_tailnet).unwrap().tailnet, "example.com");

        with_tailnet.tailnet = Some(String::new());
        assert_eq!(Credentials::resolve(&with_tailnet).unwrap().tailnet, DEFAULT_TAILNET);
    }

    #[test]
    fn test_debug_never_prints_secrets() {
        let creds = Credentials::resolve(&settings(None, Some("cid"), Some("hunter2"))).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));

        let creds = Credentials::resolve(&settings(Some("tskey-api-xyz"), None, None)).unwrap();
        assert!(!format!("{:?}", creds).contains("tskey-api-xyz"));
    }
}
