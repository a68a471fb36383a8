//! Profile and account endpoints.

use crate::client::{Endpoint, LinodeClient};
use crate::error::LinodeError;
use serde::{Deserialize, Serialize};

/// The user owning the token (`GET /v4/profile`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub uid: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub restricted: bool,
}

/// Billing account details (`GET /v4/account`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub balance_uninvoiced: f64,
    #[serde(default)]
    pub active_since: Option<String>,
    #[serde(default)]
    pub euuid: Option<String>,
}

impl LinodeClient {
    /// Fetch the profile of the token owner. Used to verify a token.
    pub async fn get_profile(&self) -> Result<Profile, LinodeError> {
        self.get(Endpoint::fixed("/v4/profile")).await
    }

    /// Fetch the account the token belongs to.
    pub async fn get_account(&self) -> Result<AccountInfo, LinodeError> {
        self.get(Endpoint::fixed("/v4/account")).await
    }
}
