//! Shared handle to the authenticated remote API client.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::{info, warn};

use super::api::TailscaleApi;
use super::client::HttpClient;
use super::error::ClientError;
use super::types::FieldSet;
use crate::core::config::TailscaleConfig;
use crate::core::credentials::Credentials;

/// Process-wide handle to the remote API client.
///
/// Cloning is cheap and every clone sees the same client. The client is
/// never replaced while serving today; the lock is the seam for rotating
/// credentials later. It is only held long enough to clone the `Arc`.
#[derive(Clone)]
pub struct ClientHandle {
    client: Arc<RwLock<Arc<dyn TailscaleApi>>>,
}

impl ClientHandle {
    /// Wrap an existing API implementation.
    pub fn new(client: Arc<dyn TailscaleApi>) -> Self {
        Self {
            client: Arc::new(RwLock::new(client)),
        }
    }

    /// Build the HTTPS client for the resolved credentials.
    pub fn connect(credentials: &Credentials, settings: &TailscaleConfig) -> Result<Self, ClientError> {
        let client = HttpClient::new(
            credentials,
            &settings.base_url,
            Duration::from_secs(settings.timeout_secs),
        )?;
        info!(
            "Tailscale client ready (tailnet: {}, auth: {}, api: {})",
            credentials.tailnet,
            credentials.mode.label(),
            settings.base_url
        );
        Ok(Self::new(Arc::new(client)))
    }

    /// Current client. Never performs I/O.
    pub fn get_client(&self) -> Arc<dyn TailscaleApi> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap the underlying client; in-flight calls keep the one they started with.
    pub fn replace_client(&self, client: Arc<dyn TailscaleApi>) {
        *self.client.write().unwrap_or_else(PoisonError::into_inner) = client;
    }

    /// Probe the API with a single device listing.
    pub async fn validate_connection(&self) -> Result<(), ClientError> {
        let devices = self
            .get_client()
            .list_devices(FieldSet::Default)
            .await
            .map_err(|e| {
                if matches!(e.status(), Some(401 | 403)) {
                    warn!("Tailscale rejected the credentials; check the API key or OAuth client scopes");
                }
                ClientError::Connectivity(e)
            })?;
        info!("Tailscale connection validated ({} devices visible)", devices.len());
        Ok(())
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle").finish_non_exhaustive()
    }
}
