//! CLI command implementations for the cloudmcp server.

pub mod check;
pub mod serve;
pub mod tools;

use anyhow::{Context, Result};
use cloudmcp_core::CloudMcpConfig;
use std::path::Path;

/// Load and validate the configuration at `path`.
///
/// A missing file is not an error when `LINODE_TOKEN` can stand in for the
/// accounts section.
pub fn load_config(path: &Path) -> Result<CloudMcpConfig> {
    if path.exists() {
        return CloudMcpConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()));
    }

    tracing::warn!(
        config = %path.display(),
        "Configuration file not found, using defaults"
    );
    let mut config = CloudMcpConfig::default();
    config.apply_env_fallback();
    config
        .validate()
        .with_context(|| format!("No usable configuration at {}", path.display()))?;
    Ok(config)
}
