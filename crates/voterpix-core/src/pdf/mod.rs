//! PDF processing module.
//!
//! Reading a document and encoding rasters are collaborator concerns; the
//! pipeline only talks to them through [`DocumentReader`] and
//! [`ImageEncoder`].

mod encoder;
mod extractor;
mod placement;

pub use encoder::JpegEncoder;
pub use extractor::PdfExtractor;

use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use serde::Serialize;
use tracing::trace;

use crate::error::{DocumentError, PageImageError};

/// Result type for document reads.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Trait for per-page document access.
pub trait DocumentReader {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Plain text of a page (1-indexed).
    fn page_text(&self, page: u32) -> Result<String>;

    /// Images drawn on a page (1-indexed), in content-stream order.
    fn page_images(&self, page: u32) -> Result<Vec<PageImage>>;
}

/// Trait for raster encoders used to persist page images.
pub trait ImageEncoder: Send + Sync {
    /// File extension of the encoded output, without the dot.
    fn extension(&self) -> &str;

    /// Encode a raster to bytes.
    fn encode(&self, image: &DynamicImage) -> std::result::Result<Vec<u8>, PageImageError>;
}

/// Axis-aligned placement of an image on its page, in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest box containing all points.
    pub fn from_points(points: &[(f32, f32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min_x, mut min_y) = *first;
        let (mut max_x, mut max_y) = *first;
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// An image drawn on a page.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Position in content-stream order (0-indexed).
    pub index: usize,
    /// XObject resource name.
    pub name: String,
    /// Placement on the page.
    pub bbox: BoundingBox,
    /// Undecoded image data.
    pub source: ImageSource,
}

/// Raw image XObject data, decoded on demand.
#[derive(Debug, Clone)]
pub struct ImageSource {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Compression filter still applied to `data` (e.g. DCTDecode).
    pub filter: Option<String>,
    /// Color space name.
    pub color_space: String,
    /// Bits per color component.
    pub bits_per_component: u8,
    /// Stream bytes, with lossless filters removed.
    pub data: Vec<u8>,
}

impl ImageSource {
    /// Decode to a raster.
    pub fn decode(&self) -> std::result::Result<DynamicImage, PageImageError> {
        match self.filter.as_deref() {
            Some("DCTDecode") => {
                trace!("Decoding JPEG image");
                return image::load_from_memory_with_format(&self.data, image::ImageFormat::Jpeg)
                    .map_err(|e| PageImageError::Decode(e.to_string()));
            }
            Some(other @ ("JPXDecode" | "CCITTFaxDecode" | "JBIG2Decode")) => {
                return Err(PageImageError::Unsupported(other.to_string()));
            }
            _ => {}
        }

        if self.bits_per_component != 8 {
            return Err(PageImageError::Unsupported(format!(
                "{} bits per component",
                self.bits_per_component
            )));
        }

        let pixels = (self.width as usize) * (self.height as usize);
        let (components, decoded) = match self.color_space.as_str() {
            "DeviceRGB" | "RGB" | "CalRGB" => (3, self.rgb_image(pixels)),
            "DeviceGray" | "G" | "CalGray" => (1, self.gray_image(pixels)),
            "DeviceCMYK" | "CMYK" => (4, self.cmyk_image(pixels)),
            other => return Err(PageImageError::Unsupported(format!("color space {}", other))),
        };

        decoded.ok_or_else(|| {
            PageImageError::Decode(format!(
                "expected {} bytes for {}x{} {}, found {}",
                pixels * components,
                self.width,
                self.height,
                self.color_space,
                self.data.len()
            ))
        })
    }

    fn rgb_image(&self, pixels: usize) -> Option<DynamicImage> {
        let data = self.data.get(..pixels * 3)?.to_vec();
        ImageBuffer::<Rgb<u8>, _>::from_raw(self.width, self.height, data).map(DynamicImage::ImageRgb8)
    }

    fn gray_image(&self, pixels: usize) -> Option<DynamicImage> {
        let data = self.data.get(..pixels)?.to_vec();
        ImageBuffer::<Luma<u8>, _>::from_raw(self.width, self.height, data).map(DynamicImage::ImageLuma8)
    }

    fn cmyk_image(&self, pixels: usize) -> Option<DynamicImage> {
        let data = self.data.get(..pixels * 4)?;
        let rgb: Vec<u8> = data
            .chunks_exact(4)
            .flat_map(|px| {
                let k = 255 - px[3] as u16;
                [px[0], px[1], px[2]].map(|c| ((255 - c as u16) * k / 255) as u8)
            })
            .collect();
        ImageBuffer::<Rgb<u8>, _>::from_raw(self.width, self.height, rgb).map(DynamicImage::ImageRgb8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(color_space: &str, data: Vec<u8>) -> ImageSource {
        ImageSource {
            width: 2,
            height: 1,
            filter: None,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            data,
        }
    }

    #[test]
    fn test_bbox_from_points() {
        let bbox = BoundingBox::from_points(&[(10.0, 50.0), (40.0, 50.0), (10.0, 90.0), (40.0, 90.0)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(10.0, 50.0, 30.0, 40.0));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_decode_rgb_and_gray() {
        let img = source("DeviceRGB", vec![255, 0, 0, 0, 255, 0]).decode().unwrap();
        assert_eq!((img.width(), img.height()), (2, 1));
        assert_eq!(img.to_rgb8().get_pixel(1, 0).0, [0, 255, 0]);

        let img = source("DeviceGray", vec![10, 200]).decode().unwrap();
        assert_eq!(img.to_luma8().get_pixel(1, 0).0, [200]);
    }

    #[test]
    fn test_decode_cmyk() {
        let img = source("DeviceCMYK", vec![0, 0, 0, 0, 0, 0, 0, 255]).decode().unwrap();
        let rgb = img.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_decode_short_data_fails() {
        let err = source("DeviceRGB", vec![1, 2, 3]).decode().unwrap_err();
        assert!(matches!(err, PageImageError::Decode(_)));
    }

    #[test]
    fn test_decode_unsupported() {
        let mut src = source("DeviceRGB", vec![]);
        src.filter = Some("JBIG2Decode".to_string());
        assert!(matches!(src.decode(), Err(PageImageError::Unsupported(_))));

        let src = source("Indexed", vec![0, 0]);
        assert!(matches!(src.decode(), Err(PageImageError::Unsupported(_))));
    }
}
