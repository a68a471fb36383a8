//! NodeBalancer endpoints (`/v4/nodebalancers`).

use crate::client::{Endpoint, LinodeClient};
use crate::error::LinodeError;
use serde::{Deserialize, Serialize};

/// A NodeBalancer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeBalancer {
    pub id: i64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub ipv4: String,
    #[serde(default)]
    pub ipv6: Option<String>,
    #[serde(default)]
    pub client_conn_throttle: i64,
    #[serde(default)]
    pub transfer: Option<Transfer>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Monthly transfer in megabytes. The API sends `null` for fresh balancers.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Transfer {
    #[serde(rename = "in", default)]
    pub inbound: Option<f64>,
    #[serde(rename = "out", default)]
    pub outbound: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

/// Body of `POST /v4/nodebalancers`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateNodeBalancerRequest {
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_conn_throttle: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body of `PUT /v4/nodebalancers/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateNodeBalancerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_conn_throttle: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// A port configuration of a NodeBalancer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeBalancerConfig {
    pub id: i64,
    #[serde(default)]
    pub nodebalancer_id: i64,
    #[serde(default)]
    pub port: i64,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub algorithm: String,
    #[serde(default)]
    pub stickiness: String,
    #[serde(default)]
    pub check: String,
    #[serde(default)]
    pub check_path: String,
    #[serde(default)]
    pub check_interval: i64,
    #[serde(default)]
    pub check_timeout: i64,
    #[serde(default)]
    pub check_attempts: i64,
    #[serde(default)]
    pub nodes_status: Option<NodesStatus>,
}

/// Health summary of the backend nodes of a config.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodesStatus {
    #[serde(default)]
    pub up: i64,
    #[serde(default)]
    pub down: i64,
}

/// Body of config create and update requests. Unset fields keep the API
/// default (create) or current value (update).
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeBalancerConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stickiness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_attempts: Option<i64>,
}

impl LinodeClient {
    pub async fn list_nodebalancers(&self) -> Result<Vec<NodeBalancer>, LinodeError> {
        self.list_all(Endpoint::fixed("/v4/nodebalancers")).await
    }

    pub async fn get_nodebalancer(&self, id: i64) -> Result<NodeBalancer, LinodeError> {
        self.get(Endpoint::render("/v4/nodebalancers/{id}", &[&id]))
            .await
    }

    pub async fn create_nodebalancer(
        &self,
        request: &CreateNodeBalancerRequest,
    ) -> Result<NodeBalancer, LinodeError> {
        self.post(Endpoint::fixed("/v4/nodebalancers"), request).await
    }

    pub async fn update_nodebalancer(
        &self,
        id: i64,
        request: &UpdateNodeBalancerRequest,
    ) -> Result<NodeBalancer, LinodeError> {
        self.put(Endpoint::render("/v4/nodebalancers/{id}", &[&id]), request)
            .await
    }

    pub async fn delete_nodebalancer(&self, id: i64) -> Result<(), LinodeError> {
        self.delete(Endpoint::render("/v4/nodebalancers/{id}", &[&id]))
            .await
    }

    pub async fn list_nodebalancer_configs(
        &self,
        id: i64,
    ) -> Result<Vec<NodeBalancerConfig>, LinodeError> {
        self.list_all(Endpoint::render("/v4/nodebalancers/{id}/configs", &[&id]))
            .await
    }

    pub async fn create_nodebalancer_config(
        &self,
        id: i64,
        request: &NodeBalancerConfigRequest,
    ) -> Result<NodeBalancerConfig, LinodeError> {
        self.post(
            Endpoint::render("/v4/nodebalancers/{id}/configs", &[&id]),
            request,
        )
        .await
    }

    pub async fn update_nodebalancer_config(
        &self,
        id: i64,
        config_id: i64,
        request: &NodeBalancerConfigRequest,
    ) -> Result<NodeBalancerConfig, LinodeError> {
        self.put(
            Endpoint::render(
                "/v4/nodebalancers/{id}/configs/{config_id}",
                &[&id, &config_id],
            ),
            request,
        )
        .await
    }

    pub async fn delete_nodebalancer_config(
        &self,
        id: i64,
        config_id: i64,
    ) -> Result<(), LinodeError> {
        self.delete(Endpoint::render(
            "/v4/nodebalancers/{id}/configs/{config_id}",
            &[&id, &config_id],
        ))
        .await
    }
}
