//! Linode accounts and the current-account pointer.
//!
//! The account map is fixed at construction. The only mutable state is the
//! name of the current account, guarded by a reader/writer lock: any number
//! of tool invocations may resolve it in parallel while a switch takes the
//! lock exclusively.

use crate::error::McpError;
use crate::metrics::{Metrics, STATUS_ERROR, STATUS_SUCCESS};
use cloudmcp_core::CloudMcpConfig;
use cloudmcp_linode::{LinodeClient, LinodeError};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Account lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("account not found: {name}")]
    NotFound { name: String },
}

/// A configured Linode account. Immutable once built.
#[derive(Debug)]
pub struct Account {
    name: String,
    label: String,
    client: LinodeClient,
}

impl Account {
    pub fn new(name: impl Into<String>, label: impl Into<String>, client: LinodeClient) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            client,
        }
    }

    /// Stable machine name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable label; may be empty.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// API client bound to this account's token.
    pub fn client(&self) -> &LinodeClient {
        &self.client
    }
}

/// Owns every account and tracks the current one.
#[derive(Debug)]
pub struct AccountManager {
    accounts: HashMap<String, Arc<Account>>,
    current: RwLock<String>,
    metrics: Metrics,
}

impl AccountManager {
    /// Build a manager whose current account is `default`.
    pub fn new(
        accounts: impl IntoIterator<Item = Account>,
        default: &str,
        metrics: Metrics,
    ) -> Result<Self, AccountError> {
        let accounts: HashMap<String, Arc<Account>> = accounts
            .into_iter()
            .map(|a| (a.name.clone(), Arc::new(a)))
            .collect();

        if !accounts.contains_key(default) {
            return Err(AccountError::NotFound {
                name: default.to_string(),
            });
        }

        Ok(Self {
            accounts,
            current: RwLock::new(default.to_string()),
            metrics,
        })
    }

    /// Build one account per configuration entry.
    ///
    /// Every client reports its requests to `metrics`. No network I/O is
    /// performed.
    pub fn from_config(config: &CloudMcpConfig, metrics: Metrics) -> Result<Self, McpError> {
        config.validate()?;

        let observer: Arc<Metrics> = Arc::new(metrics.clone());
        let mut accounts = Vec::with_capacity(config.accounts.len());

        for (name, account) in &config.accounts {
            let token = account.resolved_token();
            let mut builder = LinodeClient::builder(token).observer(observer.clone());
            if let Some(url) = &account.api_url {
                builder = builder.base_url(url);
            }

            let client = builder.build().map_err(|e| McpError::AccountMisconfigured {
                name: name.clone(),
                reason: match e {
                    LinodeError::MissingToken => "token is missing or empty".to_string(),
                    other => other.to_string(),
                },
            })?;

            tracing::debug!(account = %name, base_url = client.base_url(), "Configured account");
            accounts.push(Account::new(name.clone(), account.label.clone(), client));
        }

        let default = config.default_account_name().unwrap_or_default();
        Ok(Self::new(accounts, default, metrics)?)
    }

    /// The account currently designated.
    pub fn get_current(&self) -> Result<Arc<Account>, AccountError> {
        let name = self.current.read().unwrap_or_else(PoisonError::into_inner);
        self.get(&name)
    }

    /// Name of the current account at call time.
    pub fn current_name(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up an account by name.
    pub fn get(&self, name: &str) -> Result<Arc<Account>, AccountError> {
        self.accounts
            .get(name)
            .cloned()
            .ok_or_else(|| AccountError::NotFound {
                name: name.to_string(),
            })
    }

    /// Make `name` the current account and return the one it replaced.
    ///
    /// On failure the current account is left unchanged. Both outcomes are
    /// counted in `cloudmcp_account_switches_total`.
    pub fn switch(&self, name: &str) -> Result<String, AccountError> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let from = current.clone();

        if !self.accounts.contains_key(name) {
            self.metrics.record_account_switch(&from, name, STATUS_ERROR);
            tracing::warn!(from = %from, to = %name, "Account switch failed: unknown account");
            return Err(AccountError::NotFound {
                name: name.to_string(),
            });
        }

        *current = name.to_string();
        drop(current);

        self.metrics.record_account_switch(&from, name, STATUS_SUCCESS);
        tracing::info!(from = %from, to = %name, "Switched account");
        Ok(from)
    }

    /// Snapshot of account names and labels.
    pub fn list(&self) -> BTreeMap<String, String> {
        self.accounts
            .values()
            .map(|a| (a.name.clone(), a.label.clone()))
            .collect()
    }

    /// Number of configured accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
