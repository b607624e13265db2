//! HTTP implementation of the upload transport.

use crate::compress::CompressedPhoto;
use crate::transport::{ReorderRequest, TransportError, UploadRequest, UploadResponse, UploadTransport};
use async_trait::async_trait;
use base64::Engine;

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL of the listing API, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Bearer token, supplied by the surrounding auth layer.
    pub auth_token: Option<String>,
}

/// Reqwest-backed [`UploadTransport`] speaking JSON against the listing API.
pub struct HttpUploadTransport {
    config: HttpTransportConfig,
    client: reqwest::Client,
}

impl HttpUploadTransport {
    pub fn new(config: HttpTransportConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn upload_photo(
        &self,
        listing_id: &str,
        photo: &CompressedPhoto,
    ) -> Result<UploadResponse, TransportError> {
        let body = UploadRequest {
            listing_id: listing_id.to_string(),
            content: base64::engine::general_purpose::STANDARD.encode(&photo.data),
            mime_type: photo.mime_type.clone(),
            file_size: photo.data.len() as u64,
            width: photo.width,
            height: photo.height,
        };

        let response = self
            .with_auth(
                self.client
                    .post(self.url(&format!("listings/{}/photos", listing_id))),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("{}", e)))?;

        let response = Self::check(response).await?;
        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| TransportError::Other(format!("Invalid upload response: {}", e)))
    }

    async fn reorder_photos(
        &self,
        listing_id: &str,
        photo_ids: &[String],
    ) -> Result<(), TransportError> {
        let body = ReorderRequest {
            listing_id: listing_id.to_string(),
            photo_ids: photo_ids.to_vec(),
        };

        let response = self
            .with_auth(
                self.client
                    .post(self.url(&format!("listings/{}/photos/reorder", listing_id))),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("{}", e)))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete_photo(
        &self,
        listing_id: &str,
        photo_id: &str,
    ) -> Result<(), TransportError> {
        let response = self
            .with_auth(self.client.delete(
                self.url(&format!("listings/{}/photos/{}", listing_id, photo_id)),
            ))
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("{}", e)))?;

        Self::check(response).await?;
        Ok(())
    }
}
