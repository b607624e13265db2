//! Upload transport contract and wire types.
//!
//! A thin RPC boundary against the listing backend. The pipeline never
//! retries these calls: a failure surfaces its status code and body text
//! and is mapped onto per-photo error state by the upload service.

use crate::compress::CompressedPhoto;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors that can occur talking to the listing backend
#[derive(Debug)]
pub enum TransportError {
    /// Non-success HTTP response.
    Status { status: u16, body: String },
    /// Connection-level failure.
    Network(String),
    Other(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Status { status, body } => {
                write!(f, "Request failed with status {}: {}", status, body)
            }
            TransportError::Network(msg) => write!(f, "Network error: {}", msg),
            TransportError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// JSON body for the upload call; `content` is the base64 of the compressed
/// image bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub listing_id: String,
    pub content: String,
    pub mime_type: String,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
}

/// Server-confirmed photo record, metadata echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: String,
    pub cdn_url: String,
    pub sort_order: u32,
    pub is_primary: bool,
    pub file_size: u64,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

/// JSON body for the reorder call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub listing_id: String,
    pub photo_ids: Vec<String>,
}

/// RPC surface of the listing backend for photos.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Uploads one compressed photo and returns the confirmed record.
    async fn upload_photo(
        &self,
        listing_id: &str,
        photo: &CompressedPhoto,
    ) -> Result<UploadResponse, TransportError>;

    /// Persists a new display order for the listing's photos.
    async fn reorder_photos(
        &self,
        listing_id: &str,
        photo_ids: &[String],
    ) -> Result<(), TransportError>;

    /// Deletes one photo from the listing.
    async fn delete_photo(&self, listing_id: &str, photo_id: &str)
        -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_request_wire_shape() {
        let request = UploadRequest {
            listing_id: "listing-1".to_string(),
            content: "aGVsbG8=".to_string(),
            mime_type: "image/jpeg".to_string(),
            file_size: 5,
            width: 100,
            height: 80,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "listingId": "listing-1",
                "content": "aGVsbG8=",
                "mimeType": "image/jpeg",
                "fileSize": 5,
                "width": 100,
                "height": 80,
            })
        );
    }

    #[test]
    fn test_upload_response_wire_shape() {
        let response: UploadResponse = serde_json::from_value(json!({
            "id": "p1",
            "cdnUrl": "https://cdn.test/p1.jpg",
            "sortOrder": 0,
            "isPrimary": true,
            "fileSize": 1234,
            "mimeType": "image/jpeg",
            "width": 100,
            "height": 80,
        }))
        .unwrap();

        assert_eq!(response.id, "p1");
        assert_eq!(response.cdn_url, "https://cdn.test/p1.jpg");
        assert_eq!(response.sort_order, 0);
        assert!(response.is_primary);
    }

    #[test]
    fn test_reorder_request_wire_shape() {
        let request = ReorderRequest {
            listing_id: "listing-1".to_string(),
            photo_ids: vec!["p2".to_string(), "p1".to_string()],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "listingId": "listing-1",
                "photoIds": ["p2", "p1"],
            })
        );
    }

    #[test]
    fn test_status_error_surfaces_code_and_body() {
        let err = TransportError::Status {
            status: 413,
            body: "payload too large".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request failed with status 413: payload too large"
        );
    }
}
