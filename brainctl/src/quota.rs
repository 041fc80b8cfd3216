//! Brain storage quota arithmetic.
//!
//! A [`BrainQuota`] captures the capacity ceiling and consumed bytes of a
//! brain at the moment an upload is validated. The ceiling may be swapped
//! for the caller-supplied-key ceiling via [`BrainQuota::with_ceiling`]
//! before the admission check runs.

/// Snapshot of a brain's storage quota state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrainQuota {
    /// Capacity ceiling in bytes
    pub max_size_bytes: i64,
    /// Bytes already consumed by non-deleted files
    pub used_bytes: i64,
}

impl BrainQuota {
    pub fn new(max_size_bytes: i64, used_bytes: i64) -> Self {
        Self {
            max_size_bytes,
            used_bytes,
        }
    }

    /// Replace the capacity ceiling, keeping consumed bytes.
    ///
    /// Used when the caller supplies their own model API key and the
    /// configured `max_brain_size_with_key` ceiling applies instead of the
    /// brain's own.
    pub fn with_ceiling(self, ceiling: i64) -> Self {
        Self {
            max_size_bytes: ceiling,
            ..self
        }
    }

    /// Remaining free space. Negative when the brain is already over its
    /// ceiling (possible after a ceiling override shrinks the cap).
    pub fn remaining_bytes(&self) -> i64 {
        self.max_size_bytes - self.used_bytes
    }

    /// Whether a file of `file_size` bytes fits in the remaining space.
    pub fn admits(&self, file_size: i64) -> bool {
        self.remaining_bytes() - file_size >= 0
    }
}

/// Byte thresholds scanned largest-first; the first `value >= factor` wins.
const ABBREVS: [(i64, &str); 6] = [
    (1 << 50, "PB"),
    (1 << 40, "TB"),
    (1 << 30, "GB"),
    (1 << 20, "MB"),
    (1 << 10, "KB"),
    (1, "bytes"),
];

/// Convert a byte count into a human-readable string.
///
/// Binary thresholds with two-decimal formatting: `1536` -> `"1.50 KB"`.
/// Exactly 1 byte renders as `"1 byte"`; values below 1 (including 0 and
/// negatives) fall through to the `bytes` suffix.
pub fn convert_bytes(bytes: i64) -> String {
    if bytes == 1 {
        return "1 byte".to_string();
    }

    let (factor, suffix) = ABBREVS
        .iter()
        .copied()
        .find(|(factor, _)| bytes >= *factor)
        .unwrap_or((1, "bytes"));

    format!("{:.2} {}", bytes as f64 / factor as f64, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_bytes_single_byte() {
        assert_eq!(convert_bytes(1), "1 byte");
    }

    #[test]
    fn test_convert_bytes_zero_and_negative() {
        assert_eq!(convert_bytes(0), "0.00 bytes");
        assert_eq!(convert_bytes(-512), "-512.00 bytes");
    }

    #[test]
    fn test_convert_bytes_units() {
        assert_eq!(convert_bytes(512), "512.00 bytes");
        assert_eq!(convert_bytes(1024), "1.00 KB");
        assert_eq!(convert_bytes(1536), "1.50 KB");
        assert_eq!(convert_bytes(1048576), "1.00 MB");
        assert_eq!(convert_bytes(209715200), "200.00 MB");
        assert_eq!(convert_bytes(1 << 30), "1.00 GB");
        assert_eq!(convert_bytes(1 << 40), "1.00 TB");
        assert_eq!(convert_bytes(1 << 50), "1.00 PB");
    }

    #[test]
    fn test_remaining_bytes() {
        let quota = BrainQuota::new(1000, 400);
        assert_eq!(quota.remaining_bytes(), 600);

        // Over-capacity brains report negative remaining space
        let quota = BrainQuota::new(100, 400);
        assert_eq!(quota.remaining_bytes(), -300);
    }

    #[test]
    fn test_admits_boundary() {
        let quota = BrainQuota::new(1000, 400);
        assert!(quota.admits(600)); // exact fit is admitted
        assert!(!quota.admits(601));
        assert!(quota.admits(0));
    }

    #[test]
    fn test_with_ceiling_keeps_usage() {
        let quota = BrainQuota::new(100, 80).with_ceiling(1000);
        assert_eq!(quota.max_size_bytes, 1000);
        assert_eq!(quota.used_bytes, 80);
        assert_eq!(quota.remaining_bytes(), 920);
    }
}
