//! Serve command for starting the MCP server.
//!
//! `cloudmcp serve` - Verify the default account, publish the tool catalog
//! and serve it over stdio (default) or HTTP until the input ends or ctrl-c.

use super::load_config;
use crate::logging;
use anyhow::{Context, Result};
use cloudmcp_core::Transport;
use cloudmcp_mcp::protocol::RequestContext;
use cloudmcp_mcp::{McpServer, Service};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn run(config_path: &Path, transport: Option<Transport>, port: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(transport) = transport {
        config.mcp.transport = transport;
    }
    if let Some(port) = port {
        config.mcp.port = port;
    }

    logging::init(&config.server.log_level);
    info!(
        config = %config_path.display(),
        transport = ?config.mcp.transport,
        accounts = config.accounts.len(),
        "Configuration loaded"
    );

    let service = Arc::new(Service::new(&config).context("Failed to build service")?);
    service
        .initialize(&RequestContext::new())
        .await
        .context("Failed to initialize service")?;

    let mut server = McpServer::new(service.clone(), config.mcp.clone())
        .with_metrics_path(config.metrics.path.clone());
    service
        .register_tools(&mut server)
        .context("Failed to register tools")?;
    let server = Arc::new(server);

    if config.mcp.is_http() {
        info!(
            address = %config.mcp.bind_address(),
            metrics_path = %config.metrics.path,
            "MCP HTTP server starting"
        );
    }

    let outcome = tokio::select! {
        result = server.run() => result.context("MCP server error"),
        _ = tokio::signal::ctrl_c() => {
            info!("Received ctrl-c, shutting down");
            Ok(())
        }
    };

    service
        .shutdown(&RequestContext::new())
        .await
        .context("Failed to shut down service")?;
    outcome
}
