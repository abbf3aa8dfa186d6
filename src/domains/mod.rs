//! Domains module containing business logic organized by bounded contexts.
//!
//! The server only exposes tools, grouped by area of the Tailscale admin API
//! under `tools::definitions`.

pub mod tools;
