//! Thumbnail codec

use std::io::Cursor;

use filebox_core::AppError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::detect::{detect_type, DetectedType};

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("invalid dimension: {0}")]
    InvalidDimension(u32),
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        AppError::ImageProcessing(err.to_string())
    }
}

/// Pure image operations used for thumbnails and ingestion.
pub trait ImageCodec: Send + Sync {
    /// Decode `data` and scale it so its longest side equals `max_dimension`,
    /// preserving the aspect ratio.
    fn resize(&self, data: &[u8], max_dimension: u32) -> Result<DynamicImage, ProcessingError>;

    fn encode_jpeg(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProcessingError>;

    fn detect_type(&self, data: &[u8]) -> Option<DetectedType>;

    /// Resize then encode as JPEG.
    fn thumbnail(
        &self,
        data: &[u8],
        max_dimension: u32,
        quality: u8,
    ) -> Result<Vec<u8>, ProcessingError> {
        let resized = self.resize(data, max_dimension)?;
        self.encode_jpeg(&resized, quality)
    }
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec;

impl ImageCodec for ImageCrateCodec {
    fn resize(&self, data: &[u8], max_dimension: u32) -> Result<DynamicImage, ProcessingError> {
        if max_dimension == 0 {
            return Err(ProcessingError::InvalidDimension(max_dimension));
        }

        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        Ok(img.resize(max_dimension, max_dimension, FilterType::Lanczos3))
    }

    fn encode_jpeg(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProcessingError> {
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut buffer = Vec::with_capacity((rgb.width() * rgb.height()) as usize);
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|e| ProcessingError::Encode(e.to_string()))?;

        tracing::debug!(
            width = rgb.width(),
            height = rgb.height(),
            quality,
            size_bytes = buffer.len(),
            "Encoded JPEG"
        );

        Ok(buffer)
    }

    fn detect_type(&self, data: &[u8]) -> Option<DetectedType> {
        detect_type(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 128]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_resize_downscales_longest_side() {
        let resized = ImageCrateCodec.resize(&png(400, 200), 60).unwrap();
        assert_eq!(resized.dimensions(), (60, 30));
    }

    #[test]
    fn test_resize_upscales_small_images() {
        let resized = ImageCrateCodec.resize(&png(10, 10), 360).unwrap();
        assert_eq!(resized.dimensions(), (360, 360));
    }

    #[test]
    fn test_portrait_keeps_height_as_longest_side() {
        let resized = ImageCrateCodec.resize(&png(100, 300), 720).unwrap();
        assert_eq!(resized.dimensions(), (240, 720));
    }

    #[test]
    fn test_thumbnail_is_jpeg() {
        let bytes = ImageCrateCodec.thumbnail(&png(50, 20), 60, 80).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (60, 24));
    }

    #[test]
    fn test_thumbnail_is_deterministic() {
        let source = png(64, 48);
        let a = ImageCrateCodec.thumbnail(&source, 60, 80).unwrap();
        let b = ImageCrateCodec.thumbnail(&source, 60, 80).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resize_rejects_non_image() {
        let err = ImageCrateCodec.resize(b"not an image", 60).unwrap_err();
        assert!(matches!(err, ProcessingError::Decode(_)));
    }
}
