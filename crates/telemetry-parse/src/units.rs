//! Small numeric conversions shared by multiple parsers.

use telemetry_metrics::{Error, Result};

/// Convert a kibibyte count (as reported by `/proc/meminfo`) to bytes.
///
/// Rejects values that would overflow a `u64` instead of silently clamping,
/// since a wrapped or saturated byte count is a worse lie than an error.
pub fn kb_to_bytes(kb: u64) -> Result<u64> {
    if kb > u64::MAX / 1024 {
        return Err(Error::parse("units.kb_to_bytes", format!("{kb} kB overflows u64 bytes")));
    }
    Ok(kb * 1024)
}

/// Convert a 512-byte sector count (as reported by `/proc/diskstats`) to
/// bytes, saturating instead of overflowing.
pub fn sectors_to_bytes(sectors: u64) -> u64 {
    sectors.saturating_mul(512)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kb_to_bytes_multiplies_by_1024() {
        assert_eq!(kb_to_bytes(1).unwrap(), 1024);
        assert_eq!(kb_to_bytes(0).unwrap(), 0);
    }

    #[test]
    fn kb_to_bytes_rejects_values_that_would_overflow() {
        assert!(kb_to_bytes(u64::MAX).is_err());
        assert!(kb_to_bytes(u64::MAX / 1024 + 1).is_err());
        assert!(kb_to_bytes(u64::MAX / 1024).is_ok());
    }

    #[test]
    fn sectors_to_bytes_multiplies_by_512() {
        assert_eq!(sectors_to_bytes(2), 1024);
    }
}
