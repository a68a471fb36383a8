//! Compute instance endpoints (`/v4/linode/instances`).

use crate::client::{Endpoint, LinodeClient};
use crate::error::LinodeError;
use serde::{Deserialize, Serialize};

/// A Linode compute instance.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Instance {
    pub id: i64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub region: String,
    #[serde(rename = "type", default)]
    pub instance_type: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ipv4: Vec<String>,
    #[serde(default)]
    pub ipv6: Option<String>,
    #[serde(default)]
    pub hypervisor: Option<String>,
    #[serde(default)]
    pub specs: Option<InstanceSpecs>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Hardware allocation of an instance.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InstanceSpecs {
    #[serde(default)]
    pub disk: i64,
    #[serde(default)]
    pub memory: i64,
    #[serde(default)]
    pub vcpus: i64,
    #[serde(default)]
    pub transfer: i64,
}

/// Body of `POST /v4/linode/instances`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateInstanceRequest {
    pub region: String,
    #[serde(rename = "type")]
    pub instance_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_pass: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authorized_keys: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<bool>,
}

impl LinodeClient {
    pub async fn list_instances(&self) -> Result<Vec<Instance>, LinodeError> {
        self.list_all(Endpoint::fixed("/v4/linode/instances")).await
    }

    pub async fn get_instance(&self, id: i64) -> Result<Instance, LinodeError> {
        self.get(Endpoint::render("/v4/linode/instances/{id}", &[&id]))
            .await
    }

    pub async fn create_instance(
        &self,
        request: &CreateInstanceRequest,
    ) -> Result<Instance, LinodeError> {
        self.post(Endpoint::fixed("/v4/linode/instances"), request)
            .await
    }

    pub async fn delete_instance(&self, id: i64) -> Result<(), LinodeError> {
        self.delete(Endpoint::render("/v4/linode/instances/{id}", &[&id]))
            .await
    }

    pub async fn boot_instance(&self, id: i64) -> Result<(), LinodeError> {
        self.post_empty(Endpoint::render("/v4/linode/instances/{id}/boot", &[&id]))
            .await
    }

    pub async fn shutdown_instance(&self, id: i64) -> Result<(), LinodeError> {
        self.post_empty(Endpoint::render(
            "/v4/linode/instances/{id}/shutdown",
            &[&id],
        ))
        .await
    }

    pub async fn reboot_instance(&self, id: i64) -> Result<(), LinodeError> {
        self.post_empty(Endpoint::render("/v4/linode/instances/{id}/reboot", &[&id]))
            .await
    }
}
