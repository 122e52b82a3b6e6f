//! Decode and encode between raw byte buffers and raster buffers.
//!
//! Decoding sniffs the actual content format rather than trusting the
//! declared MIME type. Encoding uses mozjpeg for JPEG (progressive,
//! optimized coding) and the `webp` encoder for WebP; PNG goes through
//! `image` and ignores the quality parameter (lossless).

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use pixelforge_core::OutputFormat;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to decode image data: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode as {format}: {message}")]
    Encode {
        format: OutputFormat,
        message: String,
    },
}

fn output_format_for(format: ImageFormat) -> Option<OutputFormat> {
    match format {
        ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
        ImageFormat::Png => Some(OutputFormat::Png),
        ImageFormat::WebP => Some(OutputFormat::WebP),
        _ => None,
    }
}

/// Decode a byte buffer, returning the pixel grid and its detected format.
/// Decodable formats outside the supported output set carry forward as PNG
/// so nothing lossy happens to them by default.
pub fn decode(data: &[u8]) -> Result<(DynamicImage, OutputFormat), CodecError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(image::ImageError::IoError(e)))?;

    let format = reader
        .format()
        .and_then(output_format_for)
        .unwrap_or(OutputFormat::Png);

    let img = reader.decode().map_err(CodecError::Decode)?;
    Ok((img, format))
}

/// Validate a buffer decodes and return its pixel dimensions.
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), CodecError> {
    let (img, _) = decode(data)?;
    Ok(img.dimensions())
}

/// Encode a pixel grid at `quality` in `[0, 1]` (ignored for lossless
/// formats).
pub fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality: f64,
) -> Result<Bytes, CodecError> {
    match format {
        OutputFormat::Jpeg => encode_jpeg(img, quality),
        OutputFormat::Png => encode_png(img),
        OutputFormat::WebP => encode_webp(img, quality),
    }
}

/// Map the `[0, 1]` quality to the encoders' 0-100 domain.
fn scaled_quality(quality: f64) -> f32 {
    (quality.clamp(0.0, 1.0) * 100.0) as f32
}

fn encode_err(format: OutputFormat, e: impl std::fmt::Display) -> CodecError {
    CodecError::Encode {
        format,
        message: e.to_string(),
    }
}

fn encode_jpeg(img: &DynamicImage, quality: f64) -> Result<Bytes, CodecError> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(scaled_quality(quality));
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| encode_err(OutputFormat::Jpeg, e))?;
    comp.write_scanlines(&rgb_img)
        .map_err(|e| encode_err(OutputFormat::Jpeg, e))?;
    let jpeg_data = comp
        .finish()
        .map_err(|e| encode_err(OutputFormat::Jpeg, e))?;

    Ok(Bytes::from(jpeg_data))
}

fn encode_png(img: &DynamicImage) -> Result<Bytes, CodecError> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);

    img.write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| encode_err(OutputFormat::Png, e))?;

    Ok(Bytes::from(buffer))
}

fn encode_webp(img: &DynamicImage, quality: f64) -> Result<Bytes, CodecError> {
    let (width, height) = img.dimensions();
    let rgba_img = img.to_rgba8();

    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    let webp_data = encoder.encode(scaled_quality(quality));

    Ok(Bytes::copy_from_slice(&webp_data))
}
