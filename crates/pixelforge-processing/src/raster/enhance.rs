//! Enhancement operations.
//!
//! `remove_background`, `sharpen`, and `adjust_color` are extension
//! points: the contract is a pure transform with no dimension change, so
//! a real implementation (AI matting, convolution kernels) can replace a
//! placeholder without touching the orchestrator.

use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};

pub struct Enhance;

impl Enhance {
    /// Placeholder background removal: flattens the image onto a white
    /// canvas of the same dimensions.
    pub fn remove_background(img: &DynamicImage) -> DynamicImage {
        let (width, height) = img.dimensions();
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        imageops::overlay(&mut canvas, &img.to_rgba8(), 0, 0);
        // The integer blend can leave alpha at 254; the result must be
        // fully opaque.
        for pixel in canvas.pixels_mut() {
            pixel[3] = 255;
        }
        DynamicImage::ImageRgba8(canvas)
    }

    /// Placeholder sharpen: identity.
    pub fn sharpen(img: DynamicImage) -> DynamicImage {
        img
    }

    /// Placeholder color adjustment: identity.
    pub fn adjust_color(img: DynamicImage) -> DynamicImage {
        img
    }
}
