//! Service façade: the single entry point a transport talks to.
//!
//! A [`Service`] owns the account manager, the metrics registry and the tool
//! catalog. It moves through `New -> Initialized -> Serving -> Shutdown`;
//! tool calls are accepted once initialized and rejected after shutdown.

use crate::accounts::AccountManager;
use crate::args::Arguments;
use crate::error::McpError;
use crate::handlers;
use crate::metrics::Metrics;
use crate::protocol::{CallToolParams, CallToolResult, RequestContext, ToolDefinition};
use crate::tools::{ToolRegistry, ToolState};
use cloudmcp_core::CloudMcpConfig;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Capability of a transport to accept tool definitions.
pub trait ToolRegistrar {
    fn register_tool(&mut self, definition: ToolDefinition) -> Result<(), McpError>;
}

/// A protocol transport that can host the service.
pub trait McpTransport {
    /// Short name used in logs.
    fn transport_name(&self) -> &str;

    /// The transport's tool registration capability, if it has one.
    fn tool_registrar(&mut self) -> Option<&mut dyn ToolRegistrar> {
        None
    }
}

/// Lifecycle of a [`Service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    New = 0,
    Initialized = 1,
    Serving = 2,
    Shutdown = 3,
}

impl Lifecycle {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Lifecycle::New,
            1 => Lifecycle::Initialized,
            2 => Lifecycle::Serving,
            _ => Lifecycle::Shutdown,
        }
    }
}

/// The cloudmcp service.
pub struct Service {
    name: String,
    default_account: String,
    lifecycle: AtomicU8,
    catalog: ToolRegistry,
    state: ToolState,
}

impl Service {
    /// Build accounts, metrics and the tool catalog from `config`.
    ///
    /// Performs no network I/O.
    pub fn new(config: &CloudMcpConfig) -> Result<Self, McpError> {
        let metrics = Metrics::new(config.metrics.enabled);
        let accounts = AccountManager::from_config(config, metrics.clone())?;
        let default_account = accounts.current_name();
        let catalog = handlers::catalog()?;

        tracing::info!(
            accounts = accounts.len(),
            default_account = %default_account,
            tools = catalog.len(),
            metrics_enabled = metrics.is_enabled(),
            "Service constructed"
        );

        Ok(Self {
            name: config.server.name.clone(),
            default_account,
            lifecycle: AtomicU8::new(Lifecycle::New as u8),
            catalog,
            state: ToolState {
                accounts: Arc::new(accounts),
                metrics,
            },
        })
    }

    /// Name reported to MCP clients.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.lifecycle.load(Ordering::Acquire))
    }

    pub fn accounts(&self) -> &Arc<AccountManager> {
        &self.state.accounts
    }

    pub fn metrics(&self) -> &Metrics {
        &self.state.metrics
    }

    /// Every tool definition, sorted by name.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.catalog.list().into_iter().cloned().collect()
    }

    /// Verify the default account's token with one profile request.
    pub async fn initialize(&self, ctx: &RequestContext) -> Result<(), McpError> {
        match self.lifecycle() {
            Lifecycle::New => {}
            Lifecycle::Shutdown => return Err(McpError::ShutDown),
            _ => return Err(McpError::AlreadyInitialized),
        }

        let account = self.state.accounts.get(&self.default_account)?;
        tracing::info!(account = %account.name(), "Verifying default account token");

        let outcome = tokio::select! {
            profile = account.client().get_profile() => profile,
            _ = ctx.cancellation.cancelled() => return Err(McpError::Cancelled),
        };
        let profile = outcome.map_err(|source| McpError::InitializationFailed {
            account: account.name().to_string(),
            source,
        })?;

        self.lifecycle
            .compare_exchange(
                Lifecycle::New as u8,
                Lifecycle::Initialized as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| McpError::AlreadyInitialized)?;

        tracing::info!(
            account = %account.name(),
            username = %profile.username,
            "Service initialized"
        );
        Ok(())
    }

    /// Publish the catalog through the transport's registrar.
    pub fn register_tools(&self, transport: &mut dyn McpTransport) -> Result<(), McpError> {
        self.require_ready()?;

        let transport_name = transport.transport_name().to_string();
        let registrar = transport
            .tool_registrar()
            .ok_or(McpError::InvalidTransport)?;

        for definition in self.catalog.list() {
            registrar.register_tool(definition.clone())?;
        }

        let _ = self.lifecycle.compare_exchange(
            Lifecycle::Initialized as u8,
            Lifecycle::Serving as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        tracing::info!(transport = %transport_name, tools = self.catalog.len(), "Tools registered");
        Ok(())
    }

    /// Run one tool call.
    pub async fn call_tool(
        &self,
        ctx: &RequestContext,
        params: CallToolParams,
    ) -> Result<CallToolResult, McpError> {
        self.require_ready()?;

        let args = match params.arguments {
            Value::Object(map) => map,
            Value::Null => Arguments::new(),
            other => {
                return Err(McpError::InvalidArguments {
                    tool: params.name,
                    reason: format!("arguments must be an object, got {}", json_type(&other)),
                });
            }
        };

        self.catalog
            .dispatch(&self.state, ctx, &params.name, args)
            .await
    }

    /// Same path as [`call_tool`](Self::call_tool), for callers that bypass
    /// the transport.
    pub async fn call_tool_for_testing(
        &self,
        ctx: &RequestContext,
        params: CallToolParams,
    ) -> Result<CallToolResult, McpError> {
        self.call_tool(ctx, params).await
    }

    /// Stop accepting tool calls.
    pub async fn shutdown(&self, ctx: &RequestContext) -> Result<(), McpError> {
        let previous = self
            .lifecycle
            .swap(Lifecycle::Shutdown as u8, Ordering::AcqRel);
        tracing::info!(
            previous = ?Lifecycle::from_u8(previous),
            request_id = ?ctx.request_id,
            "Service shut down"
        );
        Ok(())
    }

    fn require_ready(&self) -> Result<(), McpError> {
        match self.lifecycle() {
            Lifecycle::New => Err(McpError::NotInitialized),
            Lifecycle::Shutdown => Err(McpError::ShutDown),
            Lifecycle::Initialized | Lifecycle::Serving => Ok(()),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
