//! Azure Retail Prices MCP server binary.
//!
//! Transport selection and all runtime settings come from the environment:
//!
//! - `MCP_TRANSPORT` - `stdio` or `sse` (default: `sse`)
//! - `HOST` / `PORT` - SSE bind address (default: `0.0.0.0:8080`)
//! - `MCP_SSE_PATH` / `MCP_MESSAGE_PATH` - SSE route paths
//! - `LOG_FORMAT` / `RUST_LOG` - logging format and filter

use anyhow::{Context, Result};
use tracing::info;

use azure_pricing_lib::RetailPriceClient;
use azure_pricing_mcp::config::{ServerConfig, TransportKind};
use azure_pricing_mcp::logging::{init_logging, LoggingConfig};
use azure_pricing_mcp::server::McpServer;
use azure_pricing_mcp::sse::run_sse_server;
use azure_pricing_mcp::stdio::run_stdio_server;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env().context("invalid server configuration")?;

    let logging = LoggingConfig::from_env().with_service(env!("CARGO_PKG_NAME"));
    // Stdio keeps stdout clean for protocol frames.
    init_logging(&logging, config.transport == TransportKind::Stdio);

    let client = RetailPriceClient::new().context("failed to build retail prices client")?;
    info!(
        transport = %config.transport,
        endpoint = client.endpoint(),
        "starting Azure pricing MCP server"
    );

    let server = McpServer::new(client);

    match config.transport {
        TransportKind::Stdio => run_stdio_server(server).await,
        TransportKind::Sse => run_sse_server(&config, server).await,
    }
}
