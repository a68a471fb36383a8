//! Image endpoints (`/v4/images`).
//!
//! Image IDs are strings such as `linode/debian12` or `private/15`; the
//! slash is part of the path.

use crate::client::{Endpoint, LinodeClient};
use crate::error::LinodeError;
use serde::{Deserialize, Serialize};

/// A public or private image.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Image {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub image_type: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub total_size: Option<i64>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub regions: Vec<ImageRegion>,
}

/// Replication state of an image in one region.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageRegion {
    pub region: String,
    #[serde(default)]
    pub status: String,
}

/// Body of `POST /v4/images` (capture a disk).
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateImageRequest {
    pub disk_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body of `PUT /v4/images/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateImageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Body of `POST /v4/images/{id}/regions`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplicateImageRequest {
    pub regions: Vec<String>,
}

/// Body of `POST /v4/images/upload`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadImageRequest {
    pub label: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Response of `POST /v4/images/upload`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UploadImageResponse {
    pub image: Image,
    pub upload_to: String,
}

impl LinodeClient {
    pub async fn list_images(&self) -> Result<Vec<Image>, LinodeError> {
        self.list_all(Endpoint::fixed("/v4/images")).await
    }

    pub async fn get_image(&self, id: &str) -> Result<Image, LinodeError> {
        self.get(Endpoint::identified("/v4/images/{id}", id)?).await
    }

    pub async fn create_image(&self, request: &CreateImageRequest) -> Result<Image, LinodeError> {
        self.post(Endpoint::fixed("/v4/images"), request).await
    }

    pub async fn update_image(
        &self,
        id: &str,
        request: &UpdateImageRequest,
    ) -> Result<Image, LinodeError> {
        self.put(Endpoint::identified("/v4/images/{id}", id)?, request)
            .await
    }

    pub async fn delete_image(&self, id: &str) -> Result<(), LinodeError> {
        self.delete(Endpoint::identified("/v4/images/{id}", id)?).await
    }

    pub async fn replicate_image(
        &self,
        id: &str,
        request: &ReplicateImageRequest,
    ) -> Result<Image, LinodeError> {
        self.post(Endpoint::identified("/v4/images/{id}/regions", id)?, request)
            .await
    }

    pub async fn create_image_upload(
        &self,
        request: &UploadImageRequest,
    ) -> Result<UploadImageResponse, LinodeError> {
        self.post(Endpoint::fixed("/v4/images/upload"), request).await
    }
}
