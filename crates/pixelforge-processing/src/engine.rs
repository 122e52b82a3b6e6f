//! Raster engine seam.
//!
//! The pipeline drives a [`RasterEngine`] so tests can swap in fakes.
//! [`CpuEngine`] is the production implementation; every call moves the
//! pixel work onto the blocking pool.

use async_trait::async_trait;
use bytes::Bytes;
use pixelforge_core::Operation;

use crate::codec::{self, CodecError};
use crate::raster::{Enhance, FontError, ImageResize, RasterBuffer, TextWatermark};

#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error("raster task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait RasterEngine: Send + Sync {
    async fn decode(&self, data: Bytes) -> Result<RasterBuffer, OperationError>;

    async fn apply(
        &self,
        buffer: RasterBuffer,
        operation: &Operation,
    ) -> Result<RasterBuffer, OperationError>;

    async fn encode(&self, buffer: RasterBuffer) -> Result<Bytes, OperationError>;
}

#[derive(Debug, Default, Clone)]
pub struct CpuEngine;

impl CpuEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RasterEngine for CpuEngine {
    async fn decode(&self, data: Bytes) -> Result<RasterBuffer, OperationError> {
        spawn(move || {
            let (image, format) = codec::decode(&data)?;
            Ok(RasterBuffer::new(image, format))
        })
        .await
    }

    async fn apply(
        &self,
        buffer: RasterBuffer,
        operation: &Operation,
    ) -> Result<RasterBuffer, OperationError> {
        let operation = operation.clone();
        spawn(move || apply_blocking(buffer, &operation)).await
    }

    async fn encode(&self, buffer: RasterBuffer) -> Result<Bytes, OperationError> {
        spawn(move || {
            let encoded = codec::encode(&buffer.image, buffer.format, buffer.quality)?;
            Ok(Bytes::from(encoded))
        })
        .await
    }
}

async fn spawn<T, F>(f: F) -> Result<T, OperationError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, OperationError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(err) => Err(OperationError::Task(err.to_string())),
    }
}

fn apply_blocking(
    mut buffer: RasterBuffer,
    operation: &Operation,
) -> Result<RasterBuffer, OperationError> {
    match operation {
        Operation::Upscale { scale } => {
            buffer.image = ImageResize::upscale(&buffer.image, *scale);
        }
        Operation::Resize { width, height } => {
            buffer.image = ImageResize::letterbox(&buffer.image, *width, *height);
        }
        Operation::ConvertFormat { format, quality } => {
            // Retags the buffer; encoding happens once at the end of
            // the pipeline.
            buffer.format = *format;
            buffer.quality = *quality;
        }
        Operation::RemoveBackground => {
            buffer.image = Enhance::remove_background(&buffer.image);
        }
        Operation::Sharpen => {
            buffer.image = Enhance::sharpen(buffer.image);
        }
        Operation::AdjustColor => {
            buffer.image = Enhance::adjust_color(buffer.image);
        }
        Operation::Watermark {
            text,
            position,
            opacity,
            font_size,
        } => {
            buffer.image =
                TextWatermark::apply(&buffer.image, text, *position, *opacity, *font_size)?;
        }
    }
    Ok(buffer)
}
