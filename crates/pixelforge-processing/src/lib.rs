//! Pixelforge processing pipeline
//!
//! This crate implements the image transformation pipeline:
//! - Admission gate (size/format policy, runs before any decode)
//! - Raster operations (letterbox resize, upscale, watermark, enhance
//!   placeholders)
//! - Codec (decode plus JPEG/PNG/WebP encoding)
//! - Pipeline orchestrator (ordered steps, append-only history)
//! - Preset resolver (named operation lists with bound parameters)
//! - Batch runner (bounded concurrency, per-item failure isolation)

pub mod admission;
pub mod batch;
pub mod codec;
pub mod engine;
pub mod pipeline;
pub mod preset;
pub mod raster;

pub use admission::{AdmissionGate, AdmissionReason, AdmissionResult, RejectedUpload};
pub use batch::{BatchFailure, BatchItemError, BatchOutcome, BatchRunner, BatchSuccess};
pub use codec::CodecError;
pub use engine::{CpuEngine, OperationError, RasterEngine};
pub use pipeline::{Pipeline, PipelineError, PipelineFailure, PipelineOutput, ProcessedArtifact};
pub use preset::{auto_enhance, Preset, UnknownPresetError};
pub use raster::{RasterBuffer, TextWatermark};
