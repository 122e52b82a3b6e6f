//! Pixelforge Core Library
//!
//! This crate provides the domain models shared across the pixelforge
//! pipeline: source images, the operation taxonomy, usage counters,
//! and admission policy configuration.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::AdmissionPolicy;
pub use error::InvalidOperation;
pub use models::image::SourceImage;
pub use models::operation::{
    Operation, OperationRecord, OutputFormat, StepOutcome, WatermarkPosition,
};
pub use models::stats::{format_bytes, UsageStats};
