//! third-eye-mcp: screen capture MCP server over stdio

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{ServiceExt, transport::stdio};
use third_eye_mcp_server::{
    config::{BackendChoice, ServerConfig},
    mcp::ThirdEyeMcpServer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the MCP transport
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("third_eye_mcp_server=info,third_eye_core=info")
            }),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .init();

    info!("third-eye-mcp {} starting...", env!("CARGO_PKG_VERSION"));
    info!("Protocol: Model Context Protocol (MCP)");
    info!("Transport: stdio");

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    if config.backend == BackendChoice::Mock {
        warn!("Using mock capture backend; captures are synthetic test patterns");
    }
    info!("Backend: {}, sponsored messages: {}", config.backend, config.ads_enabled);

    let dispatcher = config
        .build_dispatcher()
        .context("Failed to initialize capture backend")?;

    let server = ThirdEyeMcpServer::new(Arc::new(dispatcher));
    let service = server.serve(stdio()).await?;

    info!("third-eye-mcp initialized successfully");
    info!("Server info: {:?}", service.peer_info());
    info!("Waiting for MCP requests...");

    service.waiting().await?;

    info!("third-eye-mcp shutting down");
    Ok(())
}
