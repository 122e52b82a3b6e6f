//! Named marketplace presets and the auto-enhance chain.

use pixelforge_core::{Operation, OutputFormat, WatermarkPosition};

/// Branding applied by every preset.
pub const WATERMARK_TEXT: &str = "pixelforge.ai";
const WATERMARK_OPACITY: f64 = 0.5;
const WATERMARK_FONT_SIZE: u32 = 16;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown preset: {0}")]
pub struct UnknownPresetError(pub String);

/// Fixed target profile for one marketplace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: f64,
    pub enhance: bool,
}

const PRESETS: &[Preset] = &[
    Preset {
        name: "amazon",
        width: 1600,
        height: 1600,
        format: OutputFormat::Jpeg,
        quality: 0.95,
        enhance: true,
    },
    Preset {
        name: "shopify",
        width: 2048,
        height: 2048,
        format: OutputFormat::Jpeg,
        quality: 0.95,
        enhance: true,
    },
    Preset {
        name: "social",
        width: 1200,
        height: 1200,
        format: OutputFormat::Png,
        quality: 1.0,
        enhance: true,
    },
    Preset {
        name: "print",
        width: 3000,
        height: 3000,
        format: OutputFormat::Png,
        quality: 1.0,
        enhance: true,
    },
];

impl Preset {
    pub fn all() -> &'static [Preset] {
        PRESETS
    }

    /// Case-insensitive lookup by marketplace name.
    pub fn resolve(name: &str) -> Result<&'static Preset, UnknownPresetError> {
        let lowered = name.to_lowercase();
        PRESETS
            .iter()
            .find(|preset| preset.name == lowered)
            .ok_or_else(|| UnknownPresetError(name.to_string()))
    }

    /// Expands the preset into its operation chain. Enhancement runs
    /// first, then geometry, then format, with the watermark last so
    /// nothing resamples over it.
    pub fn operations(&self) -> Vec<Operation> {
        let mut operations = Vec::with_capacity(5);
        if self.enhance {
            operations.push(Operation::AdjustColor);
            operations.push(Operation::Sharpen);
        }
        operations.push(Operation::Resize {
            width: self.width,
            height: self.height,
        });
        operations.push(Operation::ConvertFormat {
            format: self.format,
            quality: self.quality,
        });
        operations.push(Operation::Watermark {
            text: WATERMARK_TEXT.to_string(),
            position: WatermarkPosition::BottomRight,
            opacity: WATERMARK_OPACITY,
            font_size: WATERMARK_FONT_SIZE,
        });
        operations
    }
}

/// Resolves a preset name straight to its operation chain.
pub fn resolve(name: &str) -> Result<Vec<Operation>, UnknownPresetError> {
    Ok(Preset::resolve(name)?.operations())
}

/// Standalone quality pass: upscale 1.5x, sharpen, adjust colors.
pub fn auto_enhance() -> Vec<Operation> {
    vec![
        Operation::Upscale { scale: 1.5 },
        Operation::Sharpen,
        Operation::AdjustColor,
    ]
}
