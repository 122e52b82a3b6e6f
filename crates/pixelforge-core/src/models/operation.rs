//! Operation taxonomy.
//!
//! Pipeline operations are a closed tagged enum rather than string-keyed
//! dispatch: exhaustiveness is checked at compile time and "unknown
//! operation" can only arise from true caller input (preset names,
//! serialized payloads), where it is an error value, not a panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidOperation;

/// Target encoding for `ConvertFormat` and for the final artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, InvalidOperation> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(InvalidOperation::UnknownFormat(s.to_string())),
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    /// Lossless formats ignore the quality parameter.
    pub fn is_lossless(self) -> bool {
        matches!(self, OutputFormat::Png)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Anchored watermark corner, each inset by a fixed margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl WatermarkPosition {
    pub fn parse(s: &str) -> Result<Self, InvalidOperation> {
        match s.to_lowercase().as_str() {
            "bottom-right" => Ok(WatermarkPosition::BottomRight),
            "bottom-left" => Ok(WatermarkPosition::BottomLeft),
            "top-right" => Ok(WatermarkPosition::TopRight),
            "top-left" => Ok(WatermarkPosition::TopLeft),
            _ => Err(InvalidOperation::UnknownPosition(s.to_string())),
        }
    }
}

/// One pipeline step. Construct through the validating constructors;
/// `validate` re-checks parameters for operations built literally
/// (e.g. deserialized payloads).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Upscale {
        scale: f64,
    },
    Resize {
        width: u32,
        height: u32,
    },
    ConvertFormat {
        format: OutputFormat,
        quality: f64,
    },
    RemoveBackground,
    Sharpen,
    AdjustColor,
    Watermark {
        text: String,
        position: WatermarkPosition,
        opacity: f64,
        font_size: u32,
    },
}

impl Operation {
    pub fn upscale(scale: f64) -> Result<Self, InvalidOperation> {
        let op = Operation::Upscale { scale };
        op.validate()?;
        Ok(op)
    }

    pub fn resize(width: u32, height: u32) -> Result<Self, InvalidOperation> {
        let op = Operation::Resize { width, height };
        op.validate()?;
        Ok(op)
    }

    pub fn convert_format(format: OutputFormat, quality: f64) -> Result<Self, InvalidOperation> {
        let op = Operation::ConvertFormat { format, quality };
        op.validate()?;
        Ok(op)
    }

    pub fn watermark(
        text: impl Into<String>,
        position: WatermarkPosition,
        opacity: f64,
        font_size: u32,
    ) -> Result<Self, InvalidOperation> {
        let op = Operation::Watermark {
            text: text.into(),
            position,
            opacity,
            font_size,
        };
        op.validate()?;
        Ok(op)
    }

    pub fn validate(&self) -> Result<(), InvalidOperation> {
        match self {
            Operation::Upscale { scale } => {
                if !scale.is_finite() || *scale <= 0.0 {
                    return Err(InvalidOperation::NonPositiveScale { scale: *scale });
                }
            }
            Operation::Resize { width, height } => {
                if *width == 0 || *height == 0 {
                    return Err(InvalidOperation::ZeroDimension {
                        width: *width,
                        height: *height,
                    });
                }
            }
            Operation::ConvertFormat { quality, .. } => {
                if !quality.is_finite() || !(0.0..=1.0).contains(quality) {
                    return Err(InvalidOperation::QualityOutOfRange { quality: *quality });
                }
            }
            Operation::Watermark {
                text,
                opacity,
                font_size,
                ..
            } => {
                if text.trim().is_empty() {
                    return Err(InvalidOperation::EmptyWatermarkText);
                }
                if !opacity.is_finite() || !(0.0..=1.0).contains(opacity) {
                    return Err(InvalidOperation::OpacityOutOfRange { opacity: *opacity });
                }
                if *font_size == 0 {
                    return Err(InvalidOperation::ZeroFontSize);
                }
            }
            Operation::RemoveBackground | Operation::Sharpen | Operation::AdjustColor => {}
        }
        Ok(())
    }

    /// Stable name used in errors, logs, and records.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Upscale { .. } => "upscale",
            Operation::Resize { .. } => "resize",
            Operation::ConvertFormat { .. } => "convert_format",
            Operation::RemoveBackground => "remove_background",
            Operation::Sharpen => "sharpen",
            Operation::AdjustColor => "adjust_color",
            Operation::Watermark { .. } => "watermark",
        }
    }
}

/// Result of one completed pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepOutcome {
    /// Buffer dimensions after the step was applied.
    Applied { width: u32, height: u32 },
}

/// Append-only history entry, ordered by application time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: Operation,
    pub timestamp: DateTime<Utc>,
    pub outcome: StepOutcome,
}

impl OperationRecord {
    pub fn applied(operation: Operation, width: u32, height: u32) -> Self {
        Self {
            operation,
            timestamp: Utc::now(),
            outcome: StepOutcome::Applied { width, height },
        }
    }
}
