//! Tool registry and dispatcher.
//!
//! The registry maps tool names to their definition and handler. Dispatch
//! resolves the handler, labels the call with the account that is current
//! when the call starts, runs it through the observability middleware and
//! races it against the request's cancellation token.

use crate::accounts::{Account, AccountManager};
use crate::args::Arguments;
use crate::error::{McpError, ToolError};
use crate::metrics::Metrics;
use crate::middleware;
use crate::protocol::{CallToolResult, RequestContext, ToolDefinition};
use cloudmcp_linode::LinodeError;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Boxed tool handler.
pub type ToolHandler = Arc<
    dyn Fn(ToolContext, Arguments) -> BoxFuture<'static, Result<CallToolResult, ToolError>>
        + Send
        + Sync,
>;

/// Wrap an async function as a [`ToolHandler`].
pub fn handler<F, Fut>(f: F) -> ToolHandler
where
    F: Fn(ToolContext, Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CallToolResult, ToolError>> + Send + 'static,
{
    Arc::new(move |ctx, args| f(ctx, args).boxed())
}

/// State shared by every tool invocation.
#[derive(Clone)]
pub struct ToolState {
    pub accounts: Arc<AccountManager>,
    pub metrics: Metrics,
}

/// What a handler sees of the server for one invocation.
#[derive(Clone)]
pub struct ToolContext {
    tool: String,
    account_name: String,
    state: ToolState,
}

impl ToolContext {
    pub fn new(tool: impl Into<String>, account_name: impl Into<String>, state: ToolState) -> Self {
        Self {
            tool: tool.into(),
            account_name: account_name.into(),
            state,
        }
    }

    /// Name of the running tool.
    pub fn tool_name(&self) -> &str {
        &self.tool
    }

    /// Name of the account that was current when the call started.
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// The account the call runs against, resolved once per invocation.
    pub fn account(&self) -> Result<Arc<Account>, ToolError> {
        Ok(self.state.accounts.get(&self.account_name)?)
    }

    pub fn accounts(&self) -> &AccountManager {
        &self.state.accounts
    }

    pub fn metrics(&self) -> &Metrics {
        &self.state.metrics
    }

    /// Map a client error to a [`ToolError::Provider`] for this tool.
    ///
    /// `action` reads like `"get instance"`.
    pub fn provider_err(&self, action: &str) -> impl FnOnce(LinodeError) -> ToolError {
        let tool = self.tool.clone();
        let action = action.to_string();
        move |source| ToolError::Provider {
            tool,
            action,
            source,
        }
    }
}

#[derive(Clone)]
struct RegisteredTool {
    definition: ToolDefinition,
    handler: ToolHandler,
}

/// Registry of available MCP tools.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, definition: ToolDefinition, handler: ToolHandler) -> Result<(), McpError> {
        if self.tools.contains_key(&definition.name) {
            return Err(McpError::DuplicateTool {
                name: definition.name,
            });
        }
        self.tools.insert(
            definition.name.clone(),
            RegisteredTool {
                definition,
                handler,
            },
        );
        Ok(())
    }

    /// Get a tool definition by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name).map(|t| &t.definition)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All definitions, sorted by name.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().map(|t| &t.definition).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Run the tool `name` with `args`.
    ///
    /// Handler failures come back as error-flagged results. Unknown tools
    /// and cancellation are returned as errors.
    pub async fn dispatch(
        &self,
        state: &ToolState,
        request: &RequestContext,
        name: &str,
        args: Arguments,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.tools.get(name).ok_or_else(|| McpError::ToolNotFound {
            name: name.to_string(),
        })?;

        let account = state.accounts.current_name();
        let ctx = ToolContext::new(name, account.clone(), state.clone());
        let handler = tool.handler.clone();
        let cancellation = request.cancellation.clone();

        tracing::debug!(tool = %name, account = %account, request_id = ?request.request_id, "Dispatching tool");

        middleware::instrument(&state.metrics, name, &account, async move {
            tokio::select! {
                outcome = handler(ctx, args) => Ok(outcome.unwrap_or_else(|e| {
                    tracing::debug!(tool = %name, error = %e, "Tool error");
                    CallToolResult::error(e.to_string())
                })),
                _ = cancellation.cancelled() => Err(McpError::Cancelled),
            }
        })
        .await
    }
}
