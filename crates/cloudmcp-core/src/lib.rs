//! # cloudmcp-core
//!
//! Configuration types shared by the cloudmcp crates.

pub mod config;

pub use config::{
    AccountConfig, CloudMcpConfig, ConfigError, McpConfig, MetricsConfig, ServerConfig,
    Transport,
};
