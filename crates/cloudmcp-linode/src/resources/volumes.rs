//! Block storage volume endpoints (`/v4/volumes`).

use crate::client::{Endpoint, LinodeClient};
use crate::error::LinodeError;
use serde::{Deserialize, Serialize};

/// A block storage volume.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Volume {
    pub id: i64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub linode_id: Option<i64>,
    #[serde(default)]
    pub linode_label: Option<String>,
    #[serde(default)]
    pub filesystem_path: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Body of `POST /v4/volumes`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateVolumeRequest {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linode_id: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body of `POST /v4/volumes/{id}/attach`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachVolumeRequest {
    pub linode_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_across_boots: Option<bool>,
}

impl LinodeClient {
    pub async fn list_volumes(&self) -> Result<Vec<Volume>, LinodeError> {
        self.list_all(Endpoint::fixed("/v4/volumes")).await
    }

    pub async fn get_volume(&self, id: i64) -> Result<Volume, LinodeError> {
        self.get(Endpoint::render("/v4/volumes/{id}", &[&id])).await
    }

    pub async fn create_volume(&self, request: &CreateVolumeRequest) -> Result<Volume, LinodeError> {
        self.post(Endpoint::fixed("/v4/volumes"), request).await
    }

    pub async fn delete_volume(&self, id: i64) -> Result<(), LinodeError> {
        self.delete(Endpoint::render("/v4/volumes/{id}", &[&id])).await
    }

    pub async fn attach_volume(
        &self,
        id: i64,
        request: &AttachVolumeRequest,
    ) -> Result<Volume, LinodeError> {
        self.post(Endpoint::render("/v4/volumes/{id}/attach", &[&id]), request)
            .await
    }

    pub async fn detach_volume(&self, id: i64) -> Result<(), LinodeError> {
        self.post_empty(Endpoint::render("/v4/volumes/{id}/detach", &[&id]))
            .await
    }
}
