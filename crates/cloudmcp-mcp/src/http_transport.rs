//! HTTP transport for MCP server.
//!
//! JSON-RPC requests are accepted on `POST /mcp`. The router also serves a
//! health check and the Prometheus exposition endpoint.

use crate::error::McpError;
use crate::protocol::JsonRpcRequest;
use crate::server::McpServer;
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Content type of the Prometheus text format.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Create the HTTP router for MCP.
pub fn create_router(server: Arc<McpServer>) -> Router {
    let metrics_path = server.metrics_path().to_string();
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .route(&metrics_path, get(handle_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(server): State<Arc<McpServer>>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    match server.handle_request(request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle health check requests.
async fn handle_health(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    let service = server.service();
    Json(serde_json::json!({
        "status": "ok",
        "service": service.name(),
        "version": env!("CARGO_PKG_VERSION"),
        "lifecycle": format!("{:?}", service.lifecycle()),
        "tools": server.tools().len(),
        "current_account": service.accounts().current_name(),
    }))
}

async fn handle_metrics(State(server): State<Arc<McpServer>>) -> Response {
    let metrics = server.service().metrics();
    if !metrics.is_enabled() {
        return (StatusCode::NOT_FOUND, "metrics are disabled").into_response();
    }
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        metrics.gather_text(),
    )
        .into_response()
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    address: String,
    server: Arc<McpServer>,
}

impl HttpServer {
    pub fn new(address: impl Into<String>, server: Arc<McpServer>) -> Self {
        Self {
            address: address.into(),
            server,
        }
    }

    /// Run the HTTP server.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.server);

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .map_err(|e| {
                McpError::StartupFailed(format!("failed to bind to {}: {}", self.address, e))
            })?;

        tracing::info!(address = %self.address, "MCP HTTP server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| McpError::TransportError(e.to_string()))?;

        Ok(())
    }
}
