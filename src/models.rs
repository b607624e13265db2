use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for session-scoped temporary photo ids.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Fallback shown when a failure carries no message of its own.
pub const DEFAULT_UPLOAD_ERROR: &str = "Upload failed";

/// A raw image file handed to the pipeline by the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl PhotoFile {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Reads a file from disk, guessing the MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo.jpg")
            .to_string();
        Ok(Self {
            mime_type: guess_mime_from_ext(path).to_string(),
            file_name,
            data,
        })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Determines a simple MIME type from the file extension
pub(crate) fn guess_mime_from_ext(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("heic") | Some("heif") => "image/heic",
        _ => "image/jpeg",
    }
}

/// Upload lifecycle stage reported for a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Compressing,
    Uploading,
    Success,
    Error,
}

/// In-flight stage of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStage {
    Compressing,
    Uploading,
}

/// State of one photo entry.
///
/// Placeholder, failure and confirmation are distinct variants so that a
/// confirmed photo can never carry a local preview and a failed one can
/// never carry a live progress value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhotoState {
    /// Optimistic entry created the moment a file is accepted into a batch.
    /// The preview resource behind `preview_url` is owned by the upload
    /// service, not by the store.
    Placeholder {
        temp_id: String,
        preview_url: String,
        stage: PlaceholderStage,
        /// 0 on insertion, 20 after compression, 50 when the upload starts.
        progress: u8,
    },
    /// Terminal failure. The preview has been released; removal is the
    /// caller's explicit responsibility.
    Failed {
        temp_id: String,
        error_message: String,
    },
    /// Server-acknowledged photo.
    Confirmed { id: String, cdn_url: String },
}

/// One image attached to a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// Unique within the listing, strictly increasing in insertion order.
    pub sort_order: u32,
    /// True for exactly one photo in a non-empty collection.
    pub is_primary: bool,
    pub file_size: u64,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub state: PhotoState,
}

impl Photo {
    /// The temporary id for placeholders and failures, the server id once
    /// confirmed. Ids are never reused.
    pub fn id(&self) -> &str {
        match &self.state {
            PhotoState::Placeholder { temp_id, .. } => temp_id,
            PhotoState::Failed { temp_id, .. } => temp_id,
            PhotoState::Confirmed { id, .. } => id,
        }
    }

    pub fn upload_status(&self) -> UploadStatus {
        match &self.state {
            PhotoState::Placeholder {
                stage: PlaceholderStage::Compressing,
                ..
            } => UploadStatus::Compressing,
            PhotoState::Placeholder {
                stage: PlaceholderStage::Uploading,
                ..
            } => UploadStatus::Uploading,
            PhotoState::Failed { .. } => UploadStatus::Error,
            PhotoState::Confirmed { .. } => UploadStatus::Success,
        }
    }

    pub fn upload_progress(&self) -> u8 {
        match &self.state {
            PhotoState::Placeholder { progress, .. } => *progress,
            PhotoState::Failed { .. } => 0,
            PhotoState::Confirmed { .. } => 100,
        }
    }

    /// The permanent CDN URL, present once the server has confirmed the upload.
    pub fn cdn_url(&self) -> Option<&str> {
        match &self.state {
            PhotoState::Confirmed { cdn_url, .. } => Some(cdn_url),
            _ => None,
        }
    }

    /// The local preview URL, present only while the CDN copy is unavailable.
    pub fn local_preview_url(&self) -> Option<&str> {
        match &self.state {
            PhotoState::Placeholder { preview_url, .. } => Some(preview_url),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            PhotoState::Failed { error_message, .. } => Some(error_message),
            _ => None,
        }
    }

    /// True once no further automatic transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            PhotoState::Failed { .. } | PhotoState::Confirmed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(progress: u8, stage: PlaceholderStage) -> Photo {
        Photo {
            sort_order: 0,
            is_primary: true,
            file_size: 10,
            mime_type: "image/png".to_string(),
            width: 0,
            height: 0,
            state: PhotoState::Placeholder {
                temp_id: "temp-1".to_string(),
                preview_url: "preview://abc".to_string(),
                stage,
                progress,
            },
        }
    }

    #[test]
    fn test_placeholder_accessors() {
        let photo = placeholder(0, PlaceholderStage::Compressing);
        assert_eq!(photo.id(), "temp-1");
        assert_eq!(photo.upload_status(), UploadStatus::Compressing);
        assert_eq!(photo.upload_progress(), 0);
        assert_eq!(photo.local_preview_url(), Some("preview://abc"));
        assert_eq!(photo.cdn_url(), None);
        assert!(!photo.is_terminal());

        let photo = placeholder(50, PlaceholderStage::Uploading);
        assert_eq!(photo.upload_status(), UploadStatus::Uploading);
        assert_eq!(photo.upload_progress(), 50);
    }

    #[test]
    fn test_terminal_accessors() {
        let mut photo = placeholder(50, PlaceholderStage::Uploading);
        photo.state = PhotoState::Failed {
            temp_id: "temp-1".to_string(),
            error_message: "network error".to_string(),
        };
        assert_eq!(photo.upload_status(), UploadStatus::Error);
        assert_eq!(photo.upload_progress(), 0);
        assert_eq!(photo.error_message(), Some("network error"));
        assert_eq!(photo.local_preview_url(), None);
        assert!(photo.is_terminal());

        photo.state = PhotoState::Confirmed {
            id: "p1".to_string(),
            cdn_url: "https://cdn.test/p1.jpg".to_string(),
        };
        assert_eq!(photo.id(), "p1");
        assert_eq!(photo.upload_status(), UploadStatus::Success);
        assert_eq!(photo.upload_progress(), 100);
        assert_eq!(photo.cdn_url(), Some("https://cdn.test/p1.jpg"));
        assert_eq!(photo.error_message(), None);
        assert!(photo.is_terminal());
    }

    #[test]
    fn test_guess_mime_from_ext() {
        assert_eq!(guess_mime_from_ext(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(guess_mime_from_ext(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(guess_mime_from_ext(Path::new("a.png")), "image/png");
        assert_eq!(guess_mime_from_ext(Path::new("a.webp")), "image/webp");
        assert_eq!(guess_mime_from_ext(Path::new("a.heic")), "image/heic");
        // Unknown extensions fall back to JPEG
        assert_eq!(guess_mime_from_ext(Path::new("a.xyz")), "image/jpeg");
        assert_eq!(guess_mime_from_ext(Path::new("noext")), "image/jpeg");
    }
}
