//! IP address endpoints (`/v4/networking/ips`).

use crate::client::{Endpoint, LinodeClient};
use crate::error::LinodeError;
use serde::{Deserialize, Serialize};

/// An IPv4 or IPv6 address on the account.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IpAddress {
    pub address: String,
    #[serde(rename = "type", default)]
    pub address_type: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub linode_id: Option<i64>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub subnet_mask: Option<String>,
    #[serde(default)]
    pub prefix: Option<i64>,
    #[serde(default)]
    pub rdns: Option<String>,
}

impl LinodeClient {
    pub async fn list_ips(&self) -> Result<Vec<IpAddress>, LinodeError> {
        self.list_all(Endpoint::fixed("/v4/networking/ips")).await
    }

    pub async fn get_ip(&self, address: &str) -> Result<IpAddress, LinodeError> {
        self.get(Endpoint::identified("/v4/networking/ips/{address}", address)?)
            .await
    }
}
