//! Access to the Tailscale v2 administration API.
//!
//! [`TailscaleApi`] is the seam between the MCP tools and the network:
//! [`HttpClient`] talks HTTPS to the real API, and [`ClientHandle`] is the
//! shared, cloneable handle every tool invocation reads its client from.

pub mod api;
pub mod client;
pub mod error;
pub mod handle;
pub mod oauth;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::TailscaleApi;
pub use client::HttpClient;
pub use error::{ApiError, ApiResult, ClientError};
pub use handle::ClientHandle;
