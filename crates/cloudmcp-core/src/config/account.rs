//! Linode account configuration.
//!
//! Each configured account carries its own bearer token. The token can be
//! given inline or read from an environment variable:
//! 1. `token` - the token itself
//! 2. `token_env` - name of an environment variable holding the token,
//!    used when `token` is empty

use serde::{Deserialize, Serialize};

/// Configuration for one Linode account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Personal access token for the Linode API.
    #[serde(default)]
    pub token: String,

    /// Environment variable containing the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Human-readable label shown by `linode_account_list`.
    #[serde(default)]
    pub label: String,

    /// Override for the API base URL (e.g. a local test server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AccountConfig {
    /// Create an account with an inline token.
    pub fn new(token: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the API base URL override.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// The effective token, consulting `token_env` when `token` is empty.
    ///
    /// Returns an empty string when neither source yields a token.
    pub fn resolved_token(&self) -> String {
        self.resolve_token_with(|name| std::env::var(name).ok())
    }

    /// Same as [`resolved_token`](Self::resolved_token) with a custom
    /// environment lookup.
    pub fn resolve_token_with(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        let inline = self.token.trim();
        if !inline.is_empty() {
            return inline.to_string();
        }

        if let Some(var) = &self.token_env
            && let Some(value) = lookup(var)
        {
            return value.trim().to_string();
        }

        String::new()
    }

    /// Whether the token comes from the environment.
    pub fn uses_env_token(&self) -> bool {
        self.token.trim().is_empty() && self.token_env.is_some()
    }
}
