//! Upload orchestration: the only writer that creates and replaces
//! placeholder photos.
//!
//! [`PhotoUploadService::process_files`] drives each accepted file through
//! compress → upload and mirrors every step into the photo store, so the UI
//! can render an optimistic placeholder immediately and discover per-item
//! failures purely by observing store state. Files are handled strictly
//! sequentially within one call: each placeholder's `sort_order` is the
//! collection length observed right before it is inserted, and only one
//! upload is in flight against the backend at a time.
//!
//! Overlapping `process_files` calls are not mutually excluded. Both read
//! the collection length and the remaining capacity independently, so
//! overlapping batches can exceed `max_photos`, and a delete issued while a
//! batch is in flight can make a later placeholder collide on `sort_order`.
//! Callers that care must serialize their batches.

use crate::compress::PhotoCompressor;
use crate::models::{
    Photo, PhotoFile, PhotoState, PlaceholderStage, DEFAULT_UPLOAD_ERROR, TEMP_ID_PREFIX,
};
use crate::preview::{PreviewHandle, PreviewRegistry};
use crate::store::PhotoStore;
use crate::transport::{TransportError, UploadResponse, UploadTransport};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Errors returned by the explicit photo operations (delete, reorder).
/// `process_files` never returns one; its failures live in the store.
#[derive(Debug)]
pub enum UploadServiceError {
    /// No listing draft exists yet.
    MissingListing,
    /// No photo with the given id.
    NotFound(String),
    /// The requested order does not cover the confirmed collection.
    InvalidOrder(String),
    Transport(TransportError),
}

impl std::fmt::Display for UploadServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadServiceError::MissingListing => write!(f, "No listing id set"),
            UploadServiceError::NotFound(id) => write!(f, "Photo not found: {}", id),
            UploadServiceError::InvalidOrder(msg) => write!(f, "Invalid order: {}", msg),
            UploadServiceError::Transport(e) => write!(f, "Transport error: {}", e),
        }
    }
}

impl std::error::Error for UploadServiceError {}

impl From<TransportError> for UploadServiceError {
    fn from(err: TransportError) -> Self {
        UploadServiceError::Transport(err)
    }
}

/// Drives batches of picked files through the per-photo upload state
/// machine against a shared [`PhotoStore`].
pub struct PhotoUploadService {
    store: Arc<PhotoStore>,
    previews: Arc<PreviewRegistry>,
    compressor: Arc<dyn PhotoCompressor>,
    transport: Arc<dyn UploadTransport>,
    listing_id: Mutex<Option<String>>,
    temp_counter: AtomicU64,
}

impl PhotoUploadService {
    pub fn new(
        store: Arc<PhotoStore>,
        previews: Arc<PreviewRegistry>,
        compressor: Arc<dyn PhotoCompressor>,
        transport: Arc<dyn UploadTransport>,
    ) -> Self {
        Self {
            store,
            previews,
            compressor,
            transport,
            listing_id: Mutex::new(None),
            temp_counter: AtomicU64::new(0),
        }
    }

    /// Sets the listing the photos belong to. Owned by the surrounding
    /// draft workflow; photo attachment is a no-op until this is set.
    pub fn set_listing_id(&self, listing_id: impl Into<String>) {
        *self.listing_id.lock().unwrap() = Some(listing_id.into());
    }

    pub fn listing_id(&self) -> Option<String> {
        self.listing_id.lock().unwrap().clone()
    }

    fn next_temp_id(&self) -> String {
        let count = self.temp_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", TEMP_ID_PREFIX, count)
    }

    /// Processes a batch of picked files.
    ///
    /// The batch is truncated to the remaining capacity up front; the
    /// excess is silently dropped. Each kept file runs to a terminal state
    /// (`success` or `error`) before the next one starts, and one file's
    /// failure never aborts the rest. Nothing happens while no listing id
    /// is set.
    pub async fn process_files(&self, files: Vec<PhotoFile>) {
        let listing_id = match self.listing_id() {
            Some(id) => id,
            None => {
                log::debug!("No listing id set, skipping photo batch");
                return;
            }
        };

        let remaining = self.store.remaining_slots();
        if files.len() > remaining {
            log::info!(
                "Photo limit reached, dropping {} of {} selected files",
                files.len() - remaining,
                files.len()
            );
        }

        for file in files.into_iter().take(remaining) {
            self.process_one(&listing_id, file).await;
        }
    }

    /// Runs one file to a terminal state. Failures stay inside: the photo
    /// entry carries them and the batch moves on.
    async fn process_one(&self, listing_id: &str, file: PhotoFile) {
        let temp_id = self.next_temp_id();
        let preview = self.previews.create(&file.mime_type, &file.data);

        let sort_order = self.store.len() as u32;
        let is_primary = self.store.is_empty();
        self.store.add_photo(Photo {
            sort_order,
            is_primary,
            file_size: file.size(),
            mime_type: file.mime_type.clone(),
            width: 0,
            height: 0,
            state: PhotoState::Placeholder {
                temp_id: temp_id.clone(),
                preview_url: preview.url().to_string(),
                stage: PlaceholderStage::Compressing,
                progress: 0,
            },
        });
        log::debug!(
            "Placeholder {} created for {} (sort {})",
            temp_id,
            file.file_name,
            sort_order
        );

        let compressed = match self.compressor.compress(&file).await {
            Ok(compressed) => compressed,
            Err(e) => {
                log::error!("Compression failed for {}: {}", file.file_name, e);
                self.fail_placeholder(&temp_id, preview, &e.to_string());
                return;
            }
        };

        self.store.update_photo(&temp_id, |photo| {
            photo.file_size = compressed.data.len() as u64;
            photo.mime_type = compressed.mime_type.clone();
            photo.width = compressed.width;
            photo.height = compressed.height;
            if let PhotoState::Placeholder { progress, .. } = &mut photo.state {
                *progress = 20;
            }
        });
        self.store.update_photo(&temp_id, |photo| {
            if let PhotoState::Placeholder {
                stage, progress, ..
            } = &mut photo.state
            {
                *stage = PlaceholderStage::Uploading;
                *progress = 50;
            }
        });

        match self.transport.upload_photo(listing_id, &compressed).await {
            Ok(response) => {
                self.store.remove_photo(&temp_id);
                preview.release();
                log::info!("Uploaded {} as photo {}", file.file_name, response.id);
                self.store.add_photo(confirmed_photo(response));
            }
            Err(e) => {
                log::error!("Upload failed for {}: {}", file.file_name, e);
                self.fail_placeholder(&temp_id, preview, &e.to_string());
            }
        }
    }

    /// Terminal error transition: releases the preview, then marks the
    /// placeholder failed. The entry stays in the store until the caller
    /// removes it.
    fn fail_placeholder(&self, temp_id: &str, preview: PreviewHandle, message: &str) {
        preview.release();
        let message = if message.is_empty() {
            DEFAULT_UPLOAD_ERROR
        } else {
            message
        };
        self.store.update_photo(temp_id, |photo| {
            photo.state = PhotoState::Failed {
                temp_id: temp_id.to_string(),
                error_message: message.to_string(),
            };
        });
    }

    /// Deletes a photo. Confirmed photos are deleted on the server first;
    /// placeholders (in-flight or failed) only ever existed locally, so no
    /// transport call is made for them. Deleting an in-flight placeholder
    /// does not cancel its upload.
    pub async fn delete_photo(&self, photo_id: &str) -> Result<(), UploadServiceError> {
        let listing_id = self.listing_id().ok_or(UploadServiceError::MissingListing)?;
        let photo = self
            .store
            .find(photo_id)
            .ok_or_else(|| UploadServiceError::NotFound(photo_id.to_string()))?;

        if let PhotoState::Confirmed { id, .. } = &photo.state {
            self.transport.delete_photo(&listing_id, id).await?;
        }

        self.store.remove_photo(photo_id);
        log::info!("Deleted photo {}", photo_id);
        self.promote_primary();
        Ok(())
    }

    /// Keeps the exactly-one-primary invariant after a removal: if the
    /// collection is non-empty and lost its primary, the first remaining
    /// photo takes over.
    fn promote_primary(&self) {
        if self.store.primary_photo().is_some() {
            return;
        }
        let first = match self.store.photos().first() {
            Some(photo) => photo.id().to_string(),
            None => return,
        };
        self.store.update_photo(&first, |photo| photo.is_primary = true);
        log::debug!("Promoted photo {} to primary", first);
    }

    /// Persists a new display order. Every id must be server-confirmed and
    /// the set must cover the collection exactly; otherwise the call fails
    /// without touching the server or the store.
    pub async fn reorder_photos(&self, ordered_ids: &[String]) -> Result<(), UploadServiceError> {
        let listing_id = self.listing_id().ok_or(UploadServiceError::MissingListing)?;

        let photos = self.store.photos();
        if ordered_ids.len() != photos.len() {
            return Err(UploadServiceError::InvalidOrder(format!(
                "expected {} ids, got {}",
                photos.len(),
                ordered_ids.len()
            )));
        }
        for id in ordered_ids {
            match self.store.find(id) {
                Some(photo) if matches!(photo.state, PhotoState::Confirmed { .. }) => {}
                Some(_) => {
                    return Err(UploadServiceError::InvalidOrder(format!(
                        "photo {} is not confirmed yet",
                        id
                    )))
                }
                None => return Err(UploadServiceError::NotFound(id.clone())),
            }
        }

        self.transport.reorder_photos(&listing_id, ordered_ids).await?;
        if !self.store.apply_order(ordered_ids) {
            // Collection changed while the RPC was in flight
            log::warn!("Reorder applied on the server but the local collection moved on");
        }
        Ok(())
    }
}

/// Builds the confirmed entity that replaces a successful placeholder.
fn confirmed_photo(response: UploadResponse) -> Photo {
    Photo {
        sort_order: response.sort_order,
        is_primary: response.is_primary,
        file_size: response.file_size,
        mime_type: response.mime_type,
        width: response.width,
        height: response.height,
        state: PhotoState::Confirmed {
            id: response.id,
            cdn_url: response.cdn_url,
        },
    }
}
