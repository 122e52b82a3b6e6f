//! Admission gate: size/format policy applied before any decode work.

use std::path::Path;

use bytes::Bytes;
use pixelforge_core::{format_bytes, AdmissionPolicy, SourceImage};

/// One reason a candidate file was rejected. A rejection carries every
/// applicable reason, not just the first.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdmissionReason {
    #[error("file size {} exceeds the {} limit", format_bytes(*.size), format_bytes(*.max))]
    FileTooLarge { size: u64, max: u64 },

    #[error("unsupported format: {extension:?} (supported: {})", .allowed.join(", "))]
    UnsupportedExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("empty file")]
    EmptyFile,
}

/// Outcome of the admission check. Pure function of
/// (file size, extension, policy).
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionResult {
    pub accepted: bool,
    pub reasons: Vec<AdmissionReason>,
}

impl AdmissionResult {
    /// User-facing reason strings for the ingestion surface.
    pub fn messages(&self) -> Vec<String> {
        self.reasons.iter().map(|r| r.to_string()).collect()
    }
}

fn join_reasons(reasons: &[AdmissionReason]) -> String {
    reasons
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A candidate upload refused by the gate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("upload rejected: {}", join_reasons(.reasons))]
pub struct RejectedUpload {
    pub reasons: Vec<AdmissionReason>,
}

/// Validates candidate files against the admission policy. No side
/// effects; nothing is decoded here, so oversized or mistyped input is
/// refused before any buffer work.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    policy: AdmissionPolicy,
}

impl AdmissionGate {
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Check a candidate file, accumulating every applicable reason.
    pub fn admit(&self, file_size: u64, extension: &str) -> AdmissionResult {
        let mut reasons = Vec::new();

        if file_size == 0 {
            reasons.push(AdmissionReason::EmptyFile);
        } else if file_size > self.policy.max_size_bytes {
            reasons.push(AdmissionReason::FileTooLarge {
                size: file_size,
                max: self.policy.max_size_bytes,
            });
        }

        if !self.policy.allows_extension(extension) {
            reasons.push(AdmissionReason::UnsupportedExtension {
                extension: extension.to_lowercase(),
                allowed: self.policy.allowed_extensions.clone(),
            });
        }

        AdmissionResult {
            accepted: reasons.is_empty(),
            reasons,
        }
    }

    /// Gate a candidate upload; on acceptance constructs the immutable
    /// [`SourceImage`] handed to the pipeline.
    pub fn admit_upload(
        &self,
        data: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> Result<SourceImage, RejectedUpload> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        let result = self.admit(data.len() as u64, extension);
        if !result.accepted {
            tracing::debug!(
                file_name = %file_name,
                reasons = ?result.reasons,
                "Upload rejected by admission gate"
            );
            return Err(RejectedUpload {
                reasons: result.reasons,
            });
        }

        Ok(SourceImage::new(data, file_name, content_type))
    }
}
