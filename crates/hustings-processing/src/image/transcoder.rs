use async_trait::async_trait;
use bytes::Bytes;
use hustings_core::{Config, MediaError, MediaFamily};
use image::{GenericImageView, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tokio::fs;

use super::resize::downscale_to_width;
use crate::traits::Transcoder;

/// Largest width or height libwebp accepts.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// A WebP rendition held in memory.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Re-encodes any accepted image as lossy WebP, capped at a maximum width.
#[derive(Debug, Clone)]
pub struct ImageTranscoder {
    max_width: u32,
    quality: u8,
}

impl ImageTranscoder {
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self { max_width, quality }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.image_max_width(), config.image_quality())
    }

    /// Decode, downscale and encode synchronously. Call from a blocking context.
    ///
    /// The decoder sniffs the actual format, so a PNG declared as `image/jpeg`
    /// still decodes. Animated GIFs keep their first frame.
    pub fn encode(data: &[u8], max_width: u32, quality: u8) -> Result<EncodedImage, MediaError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| MediaError::CompressionFailed(format!("Failed to read image: {}", e)))?
            .decode()
            .map_err(|e| MediaError::CompressionFailed(format!("Failed to decode image: {}", e)))?;

        let img = downscale_to_width(img, max_width);
        let (width, height) = img.dimensions();
        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(MediaError::CompressionFailed(format!(
                "Image of {}x{} exceeds the WebP limit of {} pixels per side",
                width, height, WEBP_MAX_DIMENSION
            )));
        }

        let encoded = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            let result =
                webp::Encoder::from_rgba(&rgba, width, height).encode_simple(false, quality as f32);
            result
        } else {
            let rgb = img.to_rgb8();
            let result =
                webp::Encoder::from_rgb(&rgb, width, height).encode_simple(false, quality as f32);
            result
        };
        let encoded = encoded.map_err(|e| {
            MediaError::CompressionFailed(format!(
                "WebP encoding failed for {}x{} image: {:?}",
                width, height, e
            ))
        })?;

        if encoded.is_empty() {
            return Err(MediaError::CompressionFailed(format!(
                "WebP encoder produced no output for {}x{} image",
                width, height
            )));
        }

        Ok(EncodedImage {
            data: encoded.to_vec(),
            width,
            height,
        })
    }
}

#[async_trait]
impl Transcoder for ImageTranscoder {
    fn family(&self) -> MediaFamily {
        MediaFamily::Image
    }

    async fn transcode(
        &self,
        data: Bytes,
        content_type: &str,
        output: &Path,
    ) -> Result<(), MediaError> {
        let start = std::time::Instant::now();
        let input_size = data.len();
        let (max_width, quality) = (self.max_width, self.quality);

        let encoded = tokio::task::spawn_blocking(move || Self::encode(&data, max_width, quality))
            .await
            .map_err(|e| MediaError::CompressionFailed(format!("Image task failed: {}", e)))??;

        fs::write(output, &encoded.data).await.map_err(|e| {
            MediaError::StorageUnavailable(format!(
                "Failed to write {}: {}",
                output.display(),
                e
            ))
        })?;

        tracing::debug!(
            content_type = %content_type,
            input_size,
            output_size = encoded.data.len(),
            width = encoded.width,
            height = encoded.height,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image encoded to WebP"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 128]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 100, 50]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_encode_produces_webp() {
        let encoded = ImageTranscoder::encode(&png_bytes(64, 32), 2000, 90).unwrap();
        assert_eq!((encoded.width, encoded.height), (64, 32));
        assert_eq!(&encoded.data[0..4], b"RIFF");
        assert_eq!(&encoded.data[8..12], b"WEBP");

        let decoded = image::load_from_memory(&encoded.data).unwrap();
        assert_eq!(decoded.dimensions(), (64, 32));
    }

    #[test]
    fn test_encode_downscales_wide_images() {
        let encoded = ImageTranscoder::encode(&jpeg_bytes(300, 150), 200, 90).unwrap();
        assert_eq!((encoded.width, encoded.height), (200, 100));
    }

    #[test]
    fn test_encode_rejects_garbage() {
        let err = ImageTranscoder::encode(b"definitely not an image", 2000, 90).unwrap_err();
        assert!(matches!(err, MediaError::CompressionFailed(_)));

        let err = ImageTranscoder::encode(b"", 2000, 90).unwrap_err();
        assert!(matches!(err, MediaError::CompressionFailed(_)));
    }

    #[test]
    fn test_encode_rejects_images_taller_than_webp_allows() {
        let tall = jpeg_bytes(100, WEBP_MAX_DIMENSION + 1);
        let err = ImageTranscoder::encode(&tall, 2000, 90).unwrap_err();
        assert!(matches!(err, MediaError::CompressionFailed(_)));
    }

    #[test]
    fn test_encode_accepts_max_webp_height() {
        let tall = jpeg_bytes(16, WEBP_MAX_DIMENSION);
        let encoded = ImageTranscoder::encode(&tall, 2000, 90).unwrap();
        assert_eq!((encoded.width, encoded.height), (16, WEBP_MAX_DIMENSION));
    }

    #[tokio::test]
    async fn test_transcode_tall_image_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tall.webp");
        let transcoder = ImageTranscoder::new(2000, 90);

        let err = transcoder
            .transcode(Bytes::from(png_bytes(100, 17000)), "image/png", &output)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::CompressionFailed(_)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_transcode_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.webp");
        let transcoder = ImageTranscoder::new(2000, 90);

        transcoder
            .transcode(Bytes::from(jpeg_bytes(40, 40)), "image/jpeg", &output)
            .await
            .unwrap();

        let decoded = image::open(&output).unwrap();
        assert_eq!(decoded.dimensions(), (40, 40));
    }
}
