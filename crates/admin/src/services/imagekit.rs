//! ImageKit API client for hosted product images.
//!
//! Wraps the two calls this application needs: uploading an image into a
//! folder and deleting a file by its opaque ID. Authentication is HTTP basic
//! with the private API key as the username.

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ImageKitConfig;

/// Errors that can occur when talking to the image host.
#[derive(Debug, Error)]
pub enum ImageHostError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A successfully uploaded asset: public URL plus the host's file ID.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    /// Public URL serving the asset.
    pub url: String,
    /// Opaque file identifier, needed to delete the asset later.
    #[serde(rename = "fileId")]
    pub file_id: String,
}

/// Seam for the external image host.
///
/// The production implementation is [`ImageKitClient`]; service tests use a
/// recording fake.
#[allow(async_fn_in_trait)]
pub trait ImageHost {
    /// Upload image bytes under the given folder, returning the stored
    /// asset's URL and file ID.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<UploadedImage, ImageHostError>;

    /// Delete a previously uploaded asset by file ID.
    async fn delete_file(&self, file_id: &str) -> Result<(), ImageHostError>;
}

/// ImageKit API client.
#[derive(Clone)]
pub struct ImageKitClient {
    client: reqwest::Client,
    private_key: String,
    upload_url: String,
    api_url: String,
}

impl ImageKitClient {
    /// Create a new ImageKit client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ImageKitConfig) -> Result<Self, ImageHostError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            private_key: config.private_key.expose_secret().to_owned(),
            upload_url: config.upload_url.trim_end_matches('/').to_owned(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
        })
    }
}

impl ImageHost for ImageKitClient {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<UploadedImage, ImageHostError> {
        let url = format!("{}/api/v1/files/upload", self.upload_url);

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned()),
            )
            .text("fileName", filename.to_owned())
            .text("folder", folder.to_owned());

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageHostError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadedImage = response
            .json()
            .await
            .map_err(|e| ImageHostError::Parse(e.to_string()))?;

        Ok(uploaded)
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), ImageHostError> {
        let url = format!("{}/v1/files/{file_id}", self.api_url);

        let response = self
            .client
            .delete(&url)
            .basic_auth(&self.private_key, Some(""))
            .send()
            .await?;

        let status = response.status();
        // ImageKit answers 204 No Content on successful deletion
        if !status.is_success() && status != StatusCode::NO_CONTENT {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageHostError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
