//! Image Host Client
//!
//! Thin client for the third-party image host. The host receives the raw
//! image as multipart form data and answers with the public URL; nothing is
//! stored locally.

use crate::config::Config;
use crate::error::ApiError;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct UploadReply {
    url: String,
}

pub struct ImageHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
}

impl ImageHost {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: config.image_host_upload_url.clone(),
            api_key: config.image_host_api_key.clone(),
        }
    }

    /// Upload an image and return its public URL
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, ApiError> {
        if self.upload_url.is_empty() {
            return Err(ApiError::Config(
                "IMAGE_HOST_UPLOAD_URL is not configured".to_string(),
            ));
        }

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| ApiError::Validation(format!("invalid content type: {}", e)))?;

        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Image host request failed: {:?}", e);
                ApiError::Internal("image upload failed".to_string())
            })?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "Image host rejected upload");
            return Err(ApiError::Internal("image upload failed".to_string()));
        }

        let reply: UploadReply = response.json().await.map_err(|e| {
            tracing::error!("Image host returned malformed reply: {:?}", e);
            ApiError::Internal("image upload failed".to_string())
        })?;

        Ok(reply.url)
    }
}
