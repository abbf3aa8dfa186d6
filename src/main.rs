//! MCP Server Entry Point
//!
//! Loads configuration, initializes logging, connects to the Tailscale API
//! and starts the server with the configured transport.

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use tailnet_mcp_server::core::{Config, Credentials, McpServer, TransportService};
use tailnet_mcp_server::domains::tools::ToolRegistry;
use tailnet_mcp_server::tailscale::ClientHandle;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);
    for warning in &config.warnings {
        warn!("{}", warning);
    }

    run(config).await?;

    info!("Server shutting down");

    Ok(())
}

/// Connect, register the tools and serve until the transport stops.
///
/// Nothing is served unless every step before it succeeded.
async fn run(config: Config) -> tailnet_mcp_server::Result<()> {
    let credentials = Credentials::resolve(&config.tailscale)?;
    info!(
        tailnet = %credentials.tailnet,
        auth = credentials.mode.label(),
        "Credentials resolved"
    );

    let handle = ClientHandle::connect(&credentials, &config.tailscale)?;
    handle.validate_connection().await?;

    let registry = ToolRegistry::build(handle)?;
    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::new(config, registry);

    info!("Server initialized");

    transport.run(server).await?;
    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr; stdout carries the STDIO transport.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}
