//! # Listing Photos
//!
//! A client-side photo attachment pipeline for listings.
//!
//! This crate turns user-selected image files into confirmed, ordered,
//! server-backed photo records while keeping the UI responsive:
//! - Optimistic placeholder photos with locally owned previews
//! - Sequential compress → upload per batch, with per-item error isolation
//! - An observable in-memory photo store as the single source of truth
//! - A capacity ceiling with silent truncation of over-selected batches
//!
//! ## Platform Separation
//!
//! This crate focuses on the pipeline logic. File picking, rendering and
//! authentication stay in the application crate; the compression and
//! transport seams are traits so applications (and tests) can substitute
//! their own implementations.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use listing_photos::{
//!     HttpTransportConfig, HttpUploadTransport, ImageCompressor, PhotoFile,
//!     PhotoStore, PhotoUploadService, PreviewRegistry,
//! };
//! use std::sync::Arc;
//!
//! let store = Arc::new(PhotoStore::new(10));
//! let service = PhotoUploadService::new(
//!     Arc::clone(&store),
//!     PreviewRegistry::new(),
//!     Arc::new(ImageCompressor::default()),
//!     Arc::new(HttpUploadTransport::new(HttpTransportConfig {
//!         base_url: "https://api.example.com/v1".to_string(),
//!         auth_token: None,
//!     })),
//! );
//!
//! service.set_listing_id("listing-1");
//! let file = PhotoFile::from_path(std::path::Path::new("photo.jpg"))?;
//! service.process_files(vec![file]).await;
//! ```

pub mod compress;
pub mod models;
pub mod preview;
pub mod store;
pub mod transport;
pub mod upload;

#[cfg(feature = "http")]
pub mod http;

pub use compress::{
    CompressError, CompressedPhoto, ImageCompressor, ImageCompressorConfig, PhotoCompressor,
};
pub use models::{
    Photo, PhotoFile, PhotoState, PlaceholderStage, UploadStatus, DEFAULT_UPLOAD_ERROR,
    TEMP_ID_PREFIX,
};
pub use preview::{PreviewHandle, PreviewRegistry, PREVIEW_URL_SCHEME};
pub use store::PhotoStore;
pub use transport::{ReorderRequest, TransportError, UploadRequest, UploadResponse, UploadTransport};
pub use upload::{PhotoUploadService, UploadServiceError};

#[cfg(feature = "http")]
pub use http::{HttpTransportConfig, HttpUploadTransport};
