pub mod image;
pub mod operation;
pub mod stats;

pub use image::SourceImage;
pub use operation::{Operation, OperationRecord, OutputFormat, StepOutcome, WatermarkPosition};
pub use stats::UsageStats;
