//! Error types for the MCP crate.
//!
//! [`McpError`] covers lifecycle, configuration and transport failures and is
//! returned from the service façade. [`ToolError`] covers failures inside a
//! single tool invocation; the dispatcher turns it into an error-flagged
//! result instead of a protocol error.

use crate::accounts::AccountError;
use crate::args::{ArgumentError, ArgumentErrors};
use cloudmcp_core::ConfigError;
use cloudmcp_linode::LinodeError;
use thiserror::Error;

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// A tool with the same name is already registered.
    #[error("tool already registered: {name}")]
    DuplicateTool { name: String },

    /// Invalid arguments for tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Account lookup failed outside of a tool invocation.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// A configured account cannot be used.
    #[error("account '{name}' is misconfigured: {reason}")]
    AccountMisconfigured { name: String, reason: String },

    /// Configuration is inconsistent.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The default account's token could not be verified.
    #[error("initialization failed for account '{account}': {source}")]
    InitializationFailed {
        account: String,
        #[source]
        source: LinodeError,
    },

    /// `initialize` was called more than once.
    #[error("service is already initialized")]
    AlreadyInitialized,

    /// The service has not been initialized yet.
    #[error("service is not initialized")]
    NotInitialized,

    /// The service has been shut down.
    #[error("service is shut down")]
    ShutDown,

    /// The transport cannot register tools.
    #[error("transport does not support tool registration")]
    InvalidTransport,

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// Transport error.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure of a single tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A single argument could not be coerced.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// Several arguments could not be coerced.
    #[error(transparent)]
    Arguments(#[from] ArgumentErrors),

    /// The account the invocation needs does not exist.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// The Linode API call failed.
    #[error("{tool}: failed to {action}: {source}")]
    Provider {
        tool: String,
        action: String,
        #[source]
        source: LinodeError,
    },
}
