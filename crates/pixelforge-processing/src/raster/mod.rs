//! Raster operations: pure, stateless transforms over decoded pixel grids.

pub mod enhance;
pub mod resize;
pub mod watermark;

pub use enhance::Enhance;
pub use resize::ImageResize;
pub use watermark::{FontError, TextWatermark};

use image::{DynamicImage, GenericImageView};
use pixelforge_core::OutputFormat;

/// Encoding quality used when no `ConvertFormat` step sets one.
pub const DEFAULT_QUALITY: f64 = 0.95;

/// A decoded pixel grid plus the format/quality the artifact will be
/// encoded at. Operations take a buffer and return a new one; nothing
/// mutates the source image's bytes.
#[derive(Debug, Clone)]
pub struct RasterBuffer {
    pub image: DynamicImage,
    pub format: OutputFormat,
    pub quality: f64,
}

impl RasterBuffer {
    pub fn new(image: DynamicImage, format: OutputFormat) -> Self {
        Self {
            image,
            format,
            quality: DEFAULT_QUALITY,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.image.dimensions().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_buffer_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(30, 20, Rgba([0, 0, 0, 255])));
        let buffer = RasterBuffer::new(img, OutputFormat::Png);
        assert_eq!(buffer.width(), 30);
        assert_eq!(buffer.height(), 20);
        assert_eq!(buffer.quality, DEFAULT_QUALITY);
    }
}
