//! Aggregate usage counters.
//!
//! The batch runner owns a `UsageStats` accumulator and updates it exactly
//! once per item at its terminal outcome; callers receive a plain copy,
//! never a live handle.

use serde::{Deserialize, Serialize};

/// Read-only snapshot of batch counters for the analytics surface.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_processed: u64,
    pub total_failed: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl UsageStats {
    pub fn record_success(&mut self, bytes_in: u64, bytes_out: u64) {
        self.total_processed += 1;
        self.bytes_in += bytes_in;
        self.bytes_out += bytes_out;
    }

    pub fn record_failure(&mut self, bytes_in: u64) {
        self.total_failed += 1;
        self.bytes_in += bytes_in;
    }

    pub fn merge(&mut self, other: UsageStats) {
        self.total_processed += other.total_processed;
        self.total_failed += other.total_failed;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
    }
}

/// Human-readable byte count for user-facing messages.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = (bytes as f64).log(1024.0).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    format!("{:.2} {}", value, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_success() {
        let mut stats = UsageStats::default();
        stats.record_success(1000, 400);
        stats.record_success(2000, 900);
        assert_eq!(stats.total_processed, 2);
        assert_eq!(stats.total_failed, 0);
        assert_eq!(stats.bytes_in, 3000);
        assert_eq!(stats.bytes_out, 1300);
    }

    #[test]
    fn test_record_failure_counts_input_only() {
        let mut stats = UsageStats::default();
        stats.record_failure(500);
        assert_eq!(stats.total_processed, 0);
        assert_eq!(stats.total_failed, 1);
        assert_eq!(stats.bytes_in, 500);
        assert_eq!(stats.bytes_out, 0);
    }

    #[test]
    fn test_merge() {
        let mut a = UsageStats::default();
        a.record_success(10, 5);
        let mut b = UsageStats::default();
        b.record_failure(20);
        a.merge(b);
        assert_eq!(a.total_processed, 1);
        assert_eq!(a.total_failed, 1);
        assert_eq!(a.bytes_in, 30);
        assert_eq!(a.bytes_out, 5);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512.00 Bytes");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
