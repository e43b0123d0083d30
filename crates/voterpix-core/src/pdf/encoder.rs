//! JPEG encoding of extracted page images.

use image::DynamicImage;

use super::ImageEncoder;
use crate::error::PageImageError;

/// Lossy JPEG encoder.
#[derive(Debug, Clone, Copy)]
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    /// Create an encoder with the given quality (clamped to 1 - 100).
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self::new(90)
    }
}

impl ImageEncoder for JpegEncoder {
    fn extension(&self) -> &str {
        "jpg"
    }

    fn encode(&self, img: &DynamicImage) -> Result<Vec<u8>, PageImageError> {
        // JPEG has no alpha channel
        let rgb = img.to_rgb8();
        let mut data = Vec::new();
        {
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut data, self.quality);
            encoder.encode_image(&rgb)?;
        }
        Ok(data)
    }
}
