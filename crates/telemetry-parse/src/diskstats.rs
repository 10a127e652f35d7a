//! Parser for `/proc/diskstats` lines.

use crate::units::sectors_to_bytes;
use std::time::Duration;
use telemetry_metrics::{DiskIoStats, Error, Result};

/// Parse one `/proc/diskstats` line into [`DiskIoStats`].
///
/// The documented field layout is `major minor name` followed by 11 (or, on
/// newer kernels, up to 18) space-separated counters; only the first 11 are
/// used here: reads completed, reads merged, sectors read, ms reading,
/// writes completed, writes merged, sectors written, ms writing, I/Os in
/// progress, ms doing I/O, weighted ms doing I/O. Sector counts are always
/// in 512-byte units regardless of the device's native sector size.
pub fn parse_diskstats_line(line: &str) -> Result<DiskIoStats> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 14 {
        return Err(Error::parse(
            "diskstats",
            format!("line has {} fields, need at least 14", fields.len()),
        ));
    }

    let device = fields[2].to_string();

    let num = |s: &str| -> Result<u64> {
        s.parse::<u64>()
            .map_err(|e| Error::parse("diskstats", format!("bad counter {s}: {e}")))
    };

    let read_ops = num(fields[3])?;
    let sectors_read = num(fields[5])?;
    let ms_reading = num(fields[6])?;
    let write_ops = num(fields[7])?;
    let sectors_written = num(fields[9])?;
    let ms_writing = num(fields[10])?;

    Ok(DiskIoStats {
        device,
        bytes_read: sectors_to_bytes(sectors_read),
        bytes_written: sectors_to_bytes(sectors_written),
        read_ops,
        write_ops,
        read_busy_time: Duration::from_millis(ms_reading),
        write_busy_time: Duration::from_millis(ms_writing),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_standard_diskstats_line() {
        // 8  0 sda 100 10 20000 500 80 5 16000 400 0 900 900
        let stats = parse_diskstats_line(
            "8  0 sda 100 10 20000 500 80 5 16000 400 0 900 900",
        )
        .unwrap();
        assert_eq!(stats.device, "sda");
        assert_eq!(stats.read_ops, 100);
        assert_eq!(stats.bytes_read, 20000 * 512);
        assert_eq!(stats.write_ops, 80);
        assert_eq!(stats.bytes_written, 16000 * 512);
        assert_eq!(stats.read_busy_time.as_millis(), 500);
        assert_eq!(stats.write_busy_time.as_millis(), 400);
    }

    #[test]
    fn rejects_too_short_a_line() {
        assert!(parse_diskstats_line("8 0 sda 1 2 3").is_err());
    }
}
