//! Photo compression ahead of upload.
//!
//! The pipeline treats compression as an external service behind the
//! [`PhotoCompressor`] trait. [`ImageCompressor`] is the bundled
//! implementation: aspect-preserving downscale plus JPEG re-encode, run on
//! the blocking pool so the event loop stays responsive.

use crate::models::PhotoFile;
use async_trait::async_trait;
use image::imageops::FilterType;
use std::io::Cursor;

/// Error type for compression operations
#[derive(Debug)]
pub enum CompressError {
    ImageLoad(String),
    ImageEncode(String),
    Task(String),
}

impl std::fmt::Display for CompressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressError::ImageLoad(msg) => write!(f, "Image load error: {}", msg),
            CompressError::ImageEncode(msg) => write!(f, "Image encode error: {}", msg),
            CompressError::Task(msg) => write!(f, "Task error: {}", msg),
        }
    }
}

impl std::error::Error for CompressError {}

/// Output of the compression service for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedPhoto {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

/// External compression contract: one raw file in, one resized payload with
/// its dimensions out.
#[async_trait]
pub trait PhotoCompressor: Send + Sync {
    async fn compress(&self, file: &PhotoFile) -> Result<CompressedPhoto, CompressError>;
}

/// Configuration for [`ImageCompressor`].
#[derive(Debug, Clone)]
pub struct ImageCompressorConfig {
    /// Longest edge of the output image; larger inputs are downscaled.
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl Default for ImageCompressorConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1920,
            jpeg_quality: 80,
        }
    }
}

/// Compressor backed by the `image` crate.
pub struct ImageCompressor {
    config: ImageCompressorConfig,
}

impl ImageCompressor {
    pub fn new(config: ImageCompressorConfig) -> Self {
        Self { config }
    }
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::new(ImageCompressorConfig::default())
    }
}

#[async_trait]
impl PhotoCompressor for ImageCompressor {
    async fn compress(&self, file: &PhotoFile) -> Result<CompressedPhoto, CompressError> {
        let data = file.data.clone();
        let file_name = file.file_name.clone();
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            let img = image::load_from_memory(&data)
                .map_err(|e| CompressError::ImageLoad(format!("Failed to load image: {}", e)))?;

            let (width, height) = (img.width(), img.height());
            let (target_width, target_height) =
                fit_dimensions(width, height, config.max_dimension, config.max_dimension);

            let resized = if (target_width, target_height) != (width, height) {
                img.resize(target_width, target_height, FilterType::Lanczos3)
            } else {
                img
            };

            // JPEG has no alpha channel
            let rgb = resized.to_rgb8();
            let mut buffer = Cursor::new(Vec::new());
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, config.jpeg_quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| CompressError::ImageEncode(format!("Failed to encode JPEG: {}", e)))?;

            log::debug!(
                "Compressed {}: {}x{} -> {}x{} ({} bytes)",
                file_name,
                width,
                height,
                rgb.width(),
                rgb.height(),
                buffer.get_ref().len()
            );

            Ok(CompressedPhoto {
                data: buffer.into_inner(),
                mime_type: "image/jpeg".to_string(),
                width: rgb.width(),
                height: rgb.height(),
            })
        })
        .await
        .map_err(|e| CompressError::Task(format!("Task join error: {}", e)))?
    }
}

/// Fit dimensions into a bounding box maintaining aspect ratio; never upscales.
fn fit_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    let ratio = (original_width as f32 / max_width as f32)
        .max(original_height as f32 / max_height as f32);

    if ratio > 1.0 {
        let new_width = ((original_width as f32 / ratio) as u32).max(1);
        let new_height = ((original_height as f32 / ratio) as u32).max(1);
        (new_width, new_height)
    } else {
        (original_width, original_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png_file(width: u32, height: u32) -> PhotoFile {
        let img = RgbImage::from_pixel(width, height, image::Rgb([120, 10, 200]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        PhotoFile::new("test.png", "image/png", buffer.into_inner())
    }

    #[test]
    fn test_fit_dimensions() {
        // Image larger than max
        let (w, h) = fit_dimensions(2000, 1500, 1024, 1024);
        assert!(w <= 1024);
        assert!(h <= 1024);
        assert_eq!(w as f32 / h as f32, 2000.0 / 1500.0); // Maintain aspect ratio

        // Image smaller than max is never upscaled
        let (w, h) = fit_dimensions(800, 600, 1024, 1024);
        assert_eq!(w, 800);
        assert_eq!(h, 600);
    }

    #[tokio::test]
    async fn test_compress_reencodes_as_jpeg() {
        let compressor = ImageCompressor::default();
        let compressed = compressor.compress(&png_file(32, 16)).await.unwrap();

        assert_eq!(compressed.mime_type, "image/jpeg");
        assert_eq!((compressed.width, compressed.height), (32, 16));
        assert!(!compressed.data.is_empty());
        // JPEG magic bytes
        assert_eq!(&compressed.data[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_compress_downscales_large_images() {
        let compressor = ImageCompressor::new(ImageCompressorConfig {
            max_dimension: 16,
            jpeg_quality: 80,
        });
        let compressed = compressor.compress(&png_file(64, 32)).await.unwrap();

        assert_eq!((compressed.width, compressed.height), (16, 8));
    }

    #[tokio::test]
    async fn test_compress_rejects_garbage() {
        let compressor = ImageCompressor::default();
        let file = PhotoFile::new("bad.jpg", "image/jpeg", vec![0, 1, 2, 3]);

        let err = compressor.compress(&file).await.unwrap_err();
        assert!(matches!(err, CompressError::ImageLoad(_)));
        assert!(err.to_string().starts_with("Image load error:"));
    }
}
