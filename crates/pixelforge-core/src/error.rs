//! Parameter validation errors for pipeline operations.

/// Rejected operation parameters. Raised by the `Operation` smart
/// constructors so that an invalid operation can never enter a pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidOperation {
    #[error("upscale factor must be positive and finite, got {scale}")]
    NonPositiveScale { scale: f64 },

    #[error("target dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("quality must be within [0, 1], got {quality}")]
    QualityOutOfRange { quality: f64 },

    #[error("opacity must be within [0, 1], got {opacity}")]
    OpacityOutOfRange { opacity: f64 },

    #[error("watermark text must not be empty")]
    EmptyWatermarkText,

    #[error("watermark font size must be positive")]
    ZeroFontSize,

    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    #[error("unknown watermark position: {0}")]
    UnknownPosition(String),
}
