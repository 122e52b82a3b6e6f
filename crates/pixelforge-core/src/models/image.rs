//! Source image model.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;
use uuid::Uuid;

/// An admitted candidate file. Immutable once constructed; the raw buffer
/// is shared read-only (`Bytes`) so concurrent batch items can borrow it
/// without copying. Pixel dimensions are resolved on demand by the
/// processing crate, never stored here.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub id: Uuid,
    pub data: Bytes,
    pub file_name: String,
    /// Declared by the caller; the codec sniffs the actual format.
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl SourceImage {
    pub fn new(
        data: Bytes,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        let size_bytes = data.len() as u64;
        Self {
            id: Uuid::new_v4(),
            data,
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes,
            uploaded_at: Utc::now(),
        }
    }

    /// Lowercased file extension, if the file name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}
