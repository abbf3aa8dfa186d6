//! Configuration management for the MCP server.
//!
//! Configuration is read once at startup from the process environment
//! (optionally seeded from a `.env` file) and never re-read.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};

/// Default Tailscale API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.tailscale.com";

/// Default per-request timeout for remote API calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Remote API access.
    pub tailscale: TailscaleConfig,

    /// Problems found while loading, to be logged once logging is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Raw Tailscale settings as found in the environment.
///
/// Empty strings are kept as-is; deciding which authentication mode is
/// usable is the job of [`Credentials::resolve`](super::credentials::Credentials::resolve).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TailscaleConfig {
    /// `TAILSCALE_API_KEY`
    pub api_key: Option<String>,

    /// `TAILSCALE_TAILNET`
    pub tailnet: Option<String>,

    /// `TAILSCALE_CLIENT_ID`
    pub client_id: Option<String>,

    /// `TAILSCALE_CLIENT_SECRET`
    pub client_secret: Option<String>,

    /// API origin, overridable for testing against a stand-in server.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for TailscaleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TailscaleConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("tailnet", &self.tailnet)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl TailscaleConfig {
    /// Read the Tailscale settings through `lookup` (normally `std::env::var`).
    ///
    /// Unusable values fall back to their defaults and are reported in `warnings`.
    pub fn from_lookup<F>(lookup: F, warnings: &mut Vec<String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("TAILSCALE_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup("TAILSCALE_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warnings.push(format!(
                        "Ignoring invalid TAILSCALE_TIMEOUT_SECS={:?}, using {}s",
                        raw, DEFAULT_TIMEOUT_SECS
                    ));
                    DEFAULT_TIMEOUT_SECS
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            api_key: lookup("TAILSCALE_API_KEY"),
            tailnet: lookup("TAILSCALE_TAILNET"),
            client_id: lookup("TAILSCALE_CLIENT_ID"),
            client_secret: lookup("TAILSCALE_CLIENT_SECRET"),
            base_url,
            timeout_secs,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "tailscale-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            tailscale: TailscaleConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                ..Default::default()
            },
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    /// Server settings use the `MCP_` prefix (`MCP_SERVER_NAME`, `MCP_LOG_LEVEL`),
    /// remote API settings the `TAILSCALE_` prefix.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Some(level) = lookup("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_lookup(&lookup);
        config.tailscale = TailscaleConfig::from_lookup(&lookup, &mut config.warnings);

        config
    }
}
