//! Text watermark rendering.

use std::sync::OnceLock;

use ab_glyph::{FontRef, PxScale};
use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use pixelforge_core::WatermarkPosition;

static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Inset from the anchored edges, in pixels.
const MARGIN: i64 = 20;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("watermark font unavailable: {0}")]
pub struct FontError(String);

fn font() -> Result<&'static FontRef<'static>, FontError> {
    static FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();
    FONT.get_or_init(|| FontRef::try_from_slice(FONT_BYTES).ok())
        .as_ref()
        .ok_or_else(|| FontError("embedded face failed to parse".to_string()))
}

pub struct TextWatermark;

impl TextWatermark {
    /// Alpha-blend `text` over the image at one of the four anchored
    /// corners. Dimensions are unchanged; this must run after any
    /// geometry or format step so later resampling cannot wash it out.
    pub fn apply(
        img: &DynamicImage,
        text: &str,
        position: WatermarkPosition,
        opacity: f64,
        font_size: u32,
    ) -> Result<DynamicImage, FontError> {
        let font = font()?;
        let (width, height) = img.dimensions();
        let scale = PxScale::from(font_size as f32);
        let (text_w, text_h) = text_size(scale, font, text);

        let (x, y) = match position {
            WatermarkPosition::BottomRight => (
                (width as i64 - MARGIN - text_w as i64).max(0),
                (height as i64 - MARGIN - text_h as i64).max(0),
            ),
            WatermarkPosition::BottomLeft => {
                (MARGIN, (height as i64 - MARGIN - text_h as i64).max(0))
            }
            WatermarkPosition::TopRight => ((width as i64 - MARGIN - text_w as i64).max(0), MARGIN),
            WatermarkPosition::TopLeft => (MARGIN, MARGIN),
        };

        // Render onto a transparent overlay so opacity scales the glyph
        // coverage, not the underlying pixels.
        let mut overlay_img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        draw_text_mut(
            &mut overlay_img,
            Rgba([255, 255, 255, 255]),
            x as i32,
            y as i32,
            scale,
            font,
            text,
        );

        if opacity < 1.0 {
            for pixel in overlay_img.pixels_mut() {
                pixel[3] = (pixel[3] as f64 * opacity.clamp(0.0, 1.0)) as u8;
            }
        }

        let mut base = img.to_rgba8();
        imageops::overlay(&mut base, &overlay_img, 0, 0);

        Ok(DynamicImage::ImageRgba8(base))
    }
}
