//! # cloudmcp-mcp
//!
//! MCP (Model Context Protocol) server exposing the Linode API as tools.
//!
//! The crate provides:
//!
//! - **Multi-account operation**: any number of Linode accounts, one of
//!   which is current; `linode_account_switch` changes it at runtime
//! - **A fixed tool catalog**: 48 tools covering instances, volumes,
//!   images, IP addresses, NodeBalancers and managed databases
//! - **Observability**: every tool call and every API request is timed and
//!   counted in a Prometheus registry
//! - **Cancellation**: a client cancellation drops the running handler
//!   together with its in-flight API request
//! - **Multiple Transports**: stdio and HTTP
//!
//! ## Architecture
//!
//! ```text
//! AI Agent
//!       │
//!       │ MCP protocol (list tools / call tool)
//!       ▼
//! ┌──────────────────────┐
//! │  McpServer           │  JSON-RPC, stdio or HTTP
//! │  Service             │  lifecycle, argument envelope
//! │  ToolRegistry        │  lookup, account snapshot
//! │  middleware          │  timer, counter, gauge
//! │  handler             │  coercion, client call, text
//! └──────────┬───────────┘
//!            │  one LinodeClient per account
//!            ▼
//!      api.linode.com
//! ```
//!
//! ## Example Usage
//!
//! ```ignore
//! use cloudmcp_core::CloudMcpConfig;
//! use cloudmcp_mcp::{McpServer, RequestContext, Service};
//! use std::sync::Arc;
//!
//! let config = CloudMcpConfig::load("cloudmcp.yaml")?;
//! let service = Arc::new(Service::new(&config)?);
//! service.initialize(&RequestContext::new()).await?;
//!
//! let mut server = McpServer::new(service.clone(), config.mcp.clone());
//! service.register_tools(&mut server)?;
//! Arc::new(server).run().await?;
//! ```

pub mod accounts;
pub mod args;
pub mod error;
pub mod handlers;
pub mod http_transport;
pub mod metrics;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod service;
pub mod tools;

// Re-export main types
pub use accounts::{Account, AccountError, AccountManager};
pub use args::{ArgumentError, ArgumentErrors, Arguments};
pub use error::{McpError, ToolError};
pub use metrics::Metrics;
pub use protocol::{
    CallToolParams, CallToolResult, InputSchema, JsonRpcRequest, JsonRpcResponse, PropertySpec,
    RequestContext, ToolAnnotations, ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use service::{Lifecycle, McpTransport, Service, ToolRegistrar};
pub use tools::{ToolContext, ToolHandler, ToolRegistry, ToolState};
