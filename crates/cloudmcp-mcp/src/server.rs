//! MCP server implementation.
//!
//! [`McpServer`] speaks JSON-RPC 2.0 on top of a [`Service`]. It is the
//! transport the service registers its tools with, and it keeps the
//! cancellation token of every in-flight `tools/call` so a
//! `notifications/cancelled` from the client can stop it.

use crate::error::McpError;
use crate::http_transport::HttpServer;
use crate::protocol::error_codes::*;
use crate::protocol::*;
use crate::service::{McpTransport, Service, ToolRegistrar};
use cloudmcp_core::{McpConfig, Transport};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// The MCP server.
pub struct McpServer {
    service: Arc<Service>,
    config: McpConfig,
    metrics_path: String,
    tools: Vec<ToolDefinition>,
    in_flight: InFlight,
}

/// Cancellation tokens of running `tools/call` requests, keyed by JSON-RPC id.
///
/// Each entry carries the sequence number of the call that inserted it, so a
/// call only ever removes its own entry when two requests reuse an id.
#[derive(Default)]
struct InFlight {
    next: AtomicU64,
    calls: Mutex<HashMap<String, (u64, CancellationToken)>>,
}

impl InFlight {
    fn track(&self, key: String, token: CancellationToken) -> InFlightGuard<'_> {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), (seq, token));
        InFlightGuard {
            in_flight: self,
            key,
            seq,
        }
    }

    fn token(&self, key: &str) -> Option<CancellationToken> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|(_, token)| token.clone())
    }

    fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Drops the entry of one call, including when its future is dropped
/// before completion (an HTTP client disconnecting).
struct InFlightGuard<'a> {
    in_flight: &'a InFlight,
    key: String,
    seq: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut calls = self
            .in_flight
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if calls.get(&self.key).is_some_and(|(seq, _)| *seq == self.seq) {
            calls.remove(&self.key);
        }
    }
}

impl McpServer {
    /// Create a server for `service` using the given transport configuration.
    pub fn new(service: Arc<Service>, config: McpConfig) -> Self {
        Self {
            service,
            config,
            metrics_path: "/metrics".to_string(),
            tools: Vec::new(),
            in_flight: InFlight::default(),
        }
    }

    /// Path of the Prometheus endpoint on the HTTP transport.
    pub fn with_metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = path.into();
        self
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    pub fn metrics_path(&self) -> &str {
        &self.metrics_path
    }

    /// Tools published by the service.
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Number of tool calls currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start the MCP server on the configured transport.
    pub async fn run(self: Arc<Self>) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => self.run_http().await,
        }
    }

    /// Run the server with stdio transport.
    async fn run_stdio(self: Arc<Self>) -> Result<(), McpError> {
        tracing::info!(tools = self.tools.len(), "Starting MCP server with stdio transport");
        let reader = BufReader::new(tokio::io::stdin());
        self.serve_lines(reader, tokio::io::stdout()).await?;
        tracing::info!("stdin closed");
        Ok(())
    }

    /// Run the server with HTTP transport.
    pub async fn run_http(self: Arc<Self>) -> Result<(), McpError> {
        let address = self.config.bind_address();
        HttpServer::new(address, self).run().await
    }

    /// Serve newline-delimited JSON-RPC until `reader` is exhausted.
    ///
    /// Each request runs on its own task so slow tool calls do not block the
    /// stream; responses are written by a single writer task in completion
    /// order. Returns the writer once every response has been flushed.
    pub async fn serve_lines<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<W, McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(response) = rx.recv().await {
                let mut line = serde_json::to_string(&response)?;
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
            }
            Ok::<W, McpError>(writer)
        });

        let mut lines = reader.lines();
        let mut tasks = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => {
                    let server = self.clone();
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        if let Some(response) = server.handle_request(request).await {
                            let _ = tx.send(response);
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Unparseable JSON-RPC message");
                    let _ = tx.send(JsonRpcResponse::error(
                        None,
                        PARSE_ERROR,
                        format!("Parse error: {e}"),
                    ));
                }
            }

            while tasks.try_join_next().is_some() {}
        }

        while tasks.join_next().await.is_some() {}
        drop(tx);

        writer_task
            .await
            .map_err(|e| McpError::TransportError(e.to_string()))?
    }

    /// Handle a JSON-RPC message. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let notification = request.is_notification();

        if request.jsonrpc != "2.0" {
            return (!notification).then(|| {
                JsonRpcResponse::error(id, INVALID_REQUEST, "jsonrpc must be \"2.0\"")
            });
        }

        tracing::debug!(method = %request.method, id = ?id, "Handling request");

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "notifications/initialized" | "initialized" => JsonRpcResponse::success(id, json!({})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "notifications/cancelled" => {
                self.handle_cancelled(request.params.as_ref());
                JsonRpcResponse::success(id, json!({}))
            }
            "shutdown" => self.handle_shutdown(id).await,
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        (!notification).then_some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": ServerInfo {
                name: self.service.name().to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListToolsResponse {
            tools: self.tools.clone(),
        };
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"));
            }
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let mut ctx = RequestContext::new();
        let _guard = match id.as_ref().map(request_key) {
            Some(key) => {
                ctx = ctx.with_request_id(key.clone());
                Some(self.in_flight.track(key, ctx.cancellation.clone()))
            }
            None => None,
        };

        let outcome = self.service.call_tool(&ctx, params).await;

        match outcome.and_then(|result| Ok(serde_json::to_value(result)?)) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, error_code(&e), e.to_string()),
        }
    }

    fn handle_cancelled(&self, params: Option<&Value>) {
        let Some(request_id) = params.and_then(|p| p.get("requestId")) else {
            tracing::debug!("Cancellation without requestId ignored");
            return;
        };

        let key = request_key(request_id);
        let token = self.in_flight.token(&key);

        match token {
            Some(token) => {
                let reason = params
                    .and_then(|p| p.get("reason"))
                    .and_then(Value::as_str)
                    .unwrap_or("none");
                tracing::info!(request_id = %key, reason, "Cancelling request");
                token.cancel();
            }
            None => tracing::debug!(request_id = %key, "Cancellation for unknown request"),
        }
    }

    async fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        let ctx = match &id {
            Some(id) => RequestContext::new().with_request_id(request_key(id)),
            None => RequestContext::new(),
        };
        match self.service.shutdown(&ctx).await {
            Ok(()) => JsonRpcResponse::success(id, json!(null)),
            Err(e) => JsonRpcResponse::error(id, error_code(&e), e.to_string()),
        }
    }
}

impl McpTransport for McpServer {
    fn transport_name(&self) -> &str {
        match self.config.transport {
            Transport::Stdio => "stdio",
            Transport::Http => "http",
        }
    }

    fn tool_registrar(&mut self) -> Option<&mut dyn ToolRegistrar> {
        Some(self)
    }
}

impl ToolRegistrar for McpServer {
    fn register_tool(&mut self, definition: ToolDefinition) -> Result<(), McpError> {
        if let Some(existing) = self.tools.iter_mut().find(|t| t.name == definition.name) {
            *existing = definition;
        } else {
            self.tools.push(definition);
        }
        Ok(())
    }
}

/// Stable map key for a JSON-RPC id: strings unquoted, numbers as written.
fn request_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON-RPC error code for a service error.
fn error_code(err: &McpError) -> i32 {
    match err {
        McpError::ToolNotFound { .. }
        | McpError::InvalidArguments { .. }
        | McpError::InvalidRequest(_) => INVALID_PARAMS,
        McpError::NotInitialized => SERVER_NOT_INITIALIZED,
        McpError::Cancelled => REQUEST_CANCELLED,
        _ => INTERNAL_ERROR,
    }
}
