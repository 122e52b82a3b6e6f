//! Geometry operations: aspect-preserving letterbox resize and upscale.

use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, Rgba, RgbaImage};

pub struct ImageResize;

impl ImageResize {
    /// Fit `img` into a `width`x`height` canvas: uniform scale, white
    /// background, centered placement. Content is never cropped and never
    /// stretched non-uniformly.
    pub fn letterbox(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (src_w, src_h) = img.dimensions();

        let scale = (width as f64 / src_w as f64).min(height as f64 / src_h as f64);
        let draw_w = ((src_w as f64 * scale).round() as u32).clamp(1, width);
        let draw_h = ((src_h as f64 * scale).round() as u32).clamp(1, height);

        let filter = Self::select_filter(src_w, src_h, draw_w, draw_h);
        let scaled = img.resize_exact(draw_w, draw_h, filter).to_rgba8();

        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        let offset_x = ((width - draw_w) / 2) as i64;
        let offset_y = ((height - draw_h) / 2) as i64;
        imageops::overlay(&mut canvas, &scaled, offset_x, offset_y);

        DynamicImage::ImageRgba8(canvas)
    }

    /// Scale both dimensions by `scale` (validated positive upstream).
    pub fn upscale(img: &DynamicImage, scale: f64) -> DynamicImage {
        let (src_w, src_h) = img.dimensions();
        let dst_w = ((src_w as f64 * scale).round() as u32).max(1);
        let dst_h = ((src_h as f64 * scale).round() as u32).max(1);

        img.resize_exact(dst_w, dst_h, Self::select_filter(src_w, src_h, dst_w, dst_h))
    }

    /// Quality-preserving filter choice: Lanczos3 keeps detail when
    /// shrinking, CatmullRom avoids ringing when enlarging. Never
    /// nearest-neighbor.
    pub fn select_filter(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> FilterType {
        if dst_w >= src_w && dst_h >= src_h {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }
}
