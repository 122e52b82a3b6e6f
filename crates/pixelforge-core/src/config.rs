//! Admission policy configuration.
//!
//! The policy gates candidate files before any buffer is decoded. Defaults
//! match the free tier (5 MiB, common web raster formats) and can be
//! overridden from the environment.

use std::env;

use serde::{Deserialize, Serialize};

const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Size/format policy applied by the admission gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    pub max_size_bytes: u64,
    /// Lowercased; membership checks are case-insensitive.
    pub allowed_extensions: Vec<String>,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl AdmissionPolicy {
    pub fn new(max_size_bytes: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_size_bytes,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Build a policy from the environment, falling back to defaults.
    ///
    /// `PIXELFORGE_MAX_FILE_SIZE_BYTES` overrides the size limit;
    /// `PIXELFORGE_ALLOWED_EXTENSIONS` is a comma-separated extension list.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_size_bytes = match env::var("PIXELFORGE_MAX_FILE_SIZE_BYTES") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    "Invalid PIXELFORGE_MAX_FILE_SIZE_BYTES, using default"
                );
                defaults.max_size_bytes
            }),
            Err(_) => defaults.max_size_bytes,
        };

        let allowed_extensions = match env::var("PIXELFORGE_ALLOWED_EXTENSIONS") {
            Ok(raw) => {
                let exts: Vec<String> = raw
                    .split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect();
                if exts.is_empty() {
                    tracing::warn!("Empty PIXELFORGE_ALLOWED_EXTENSIONS, using defaults");
                    defaults.allowed_extensions
                } else {
                    exts
                }
            }
            Err(_) => defaults.allowed_extensions,
        };

        Self {
            max_size_bytes,
            allowed_extensions,
        }
    }

    /// Case-insensitive extension membership check.
    pub fn allows_extension(&self, extension: &str) -> bool {
        let normalized = extension.to_lowercase();
        self.allowed_extensions.iter().any(|e| e == &normalized)
    }
}
