//! Configuration types for cloudmcp.
//!
//! Configuration is loaded from a single YAML file (`cloudmcp.yaml` by
//! default) into a [`CloudMcpConfig`].
//!
//! # Example
//!
//! ```yaml
//! server:
//!   name: cloudmcp
//!   log_level: info
//! metrics:
//!   enabled: true
//! default_account: primary
//! accounts:
//!   primary:
//!     token: "..."
//!     label: Production
//!   staging:
//!     token_env: STAGING_LINODE_TOKEN
//!     label: Staging
//! ```

pub mod account;
pub mod mcp;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub use account::AccountConfig;
pub use mcp::{McpConfig, Transport};

/// Environment variable used when no accounts are configured.
pub const LINODE_TOKEN_ENV: &str = "LINODE_TOKEN";

/// Account name synthesised from [`LINODE_TOKEN_ENV`].
pub const FALLBACK_ACCOUNT_NAME: &str = "default";

/// Complete cloudmcp configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudMcpConfig {
    /// Server identity and logging.
    #[serde(default)]
    pub server: ServerConfig,

    /// MCP transport settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Prometheus metrics settings.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Account used until `linode_account_switch` selects another one.
    #[serde(default)]
    pub default_account: Option<String>,

    /// Configured accounts keyed by their stable machine name.
    #[serde(default)]
    pub accounts: HashMap<String, AccountConfig>,
}

/// Server identity and logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported in the MCP `initialize` response.
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            log_level: default_log_level(),
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether metrics are recorded.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path of the exposition endpoint on the HTTP transport.
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_metrics_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_server_name() -> String {
    "cloudmcp".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CloudMcpConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load a file, apply environment fallbacks and validate the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_fallback();
        config.validate()?;
        Ok(config)
    }

    /// Add an account from `LINODE_TOKEN` when none are configured.
    pub fn apply_env_fallback(&mut self) {
        self.apply_env_fallback_with(|name| std::env::var(name).ok());
    }

    /// Same as [`apply_env_fallback`](Self::apply_env_fallback) with a
    /// custom environment lookup.
    pub fn apply_env_fallback_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if !self.accounts.is_empty() {
            return;
        }
        let Some(token) = lookup(LINODE_TOKEN_ENV).filter(|t| !t.trim().is_empty()) else {
            return;
        };

        self.accounts.insert(
            FALLBACK_ACCOUNT_NAME.to_string(),
            AccountConfig::new(token, "Default"),
        );
        self.default_account
            .get_or_insert_with(|| FALLBACK_ACCOUNT_NAME.to_string());
    }

    /// Name of the default account.
    ///
    /// Falls back to the only configured account when `default_account`
    /// is not set.
    pub fn default_account_name(&self) -> Option<&str> {
        if let Some(name) = &self.default_account {
            return Some(name.as_str());
        }
        if self.accounts.len() == 1 {
            return self.accounts.keys().next().map(String::as_str);
        }
        None
    }

    /// Check the structural consistency of the configuration.
    ///
    /// Token presence is checked when the service builds its accounts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accounts.is_empty() {
            return Err(ConfigError::Config(format!(
                "no accounts configured (add an `accounts` section or set {LINODE_TOKEN_ENV})"
            )));
        }

        if self.accounts.keys().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Config(
                "account names must not be empty".to_string(),
            ));
        }

        let Some(default) = self.default_account_name() else {
            return Err(ConfigError::Config(
                "default_account is required when more than one account is configured"
                    .to_string(),
            ));
        };

        if !self.accounts.contains_key(default) {
            return Err(ConfigError::Config(format!(
                "default account '{default}' is not among the configured accounts"
            )));
        }

        Ok(())
    }

    /// Get an account by name.
    pub fn get_account(&self, name: &str) -> Option<&AccountConfig> {
        self.accounts.get(name)
    }
}
