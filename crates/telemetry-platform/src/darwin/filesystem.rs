//! Filesystem and disk metrics via `getmntinfo(3)`, `statfs(2)`, and
//! `iostat -d -I`.

use super::sysctl;
use crate::{DiskIoStats, FilesystemProvider, FilesystemStats, MountInfo, Result};
use std::process::Command;
use std::time::Duration;
use telemetry_metrics::Error;

pub struct DarwinFilesystemProvider;

impl FilesystemProvider for DarwinFilesystemProvider {
    fn mounts(&self) -> Result<Vec<MountInfo>> {
        Ok(sysctl::mounts()?
            .into_iter()
            .map(|m| MountInfo {
                device: m.device,
                mount_point: m.mount_point,
                fs_type: m.fs_type,
                options: Vec::new(),
            })
            .collect())
    }

    fn stats(&self, mount_point: &str) -> Result<FilesystemStats> {
        let s = sysctl::statfs(mount_point)?;
        let used_bytes = s.total_bytes.saturating_sub(s.available_bytes);
        let used_percent = if s.total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / s.total_bytes as f64) * 100.0
        };

        Ok(FilesystemStats {
            total_bytes: s.total_bytes,
            used_bytes,
            free_bytes: s.free_bytes,
            used_percent,
            inodes_total: s.inodes_total,
            inodes_used: s.inodes_total.saturating_sub(s.inodes_free),
            inodes_free: s.inodes_free,
        })
    }

    /// `iostat -d -I` reports one cumulative MB-transferred-since-boot
    /// figure plus a transfer count per device; it does not distinguish
    /// reads from writes. Per the spec's documented approximation, both
    /// directions are populated with an identical 50/50 split of the total
    /// so every local platform's `DiskIoStats` stays populated rather than
    /// failing outright; callers needing a true per-direction split cannot
    /// get one from this source.
    fn disk_io(&self, device: &str) -> Result<DiskIoStats> {
        let output = Command::new("iostat")
            .args(["-d", "-I", device])
            .output()
            .map_err(|e| Error::io("filesystem.disk_io", e))?;
        if !output.status.success() {
            return Err(Error::not_found("filesystem.disk_io", device));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        parse_iostat_disk_i(&text, device)
    }
}

/// Parse `iostat -d -I <device>` output. The first line is a device-name
/// banner, the second names columns `KB/t tps MB`, and the third gives
/// cumulative transfers (`tps`) and cumulative megabytes (`MB`) since boot
/// for the named device.
fn parse_iostat_disk_i(text: &str, device: &str) -> Result<DiskIoStats> {
    let mut lines = text.lines();
    let _banner = lines.next();
    let header = lines.next().unwrap_or_default();
    let data = lines.next();

    let columns: Vec<&str> = header.split_whitespace().collect();
    let tps_idx = columns.iter().position(|c| *c == "tps");
    let mb_idx = columns.iter().position(|c| *c == "MB");

    let (Some(tps_idx), Some(mb_idx), Some(data)) = (tps_idx, mb_idx, data) else {
        return Err(Error::parse("filesystem.disk_io", "unexpected iostat header"));
    };

    let fields: Vec<&str> = data.split_whitespace().collect();
    let transfers: u64 = fields
        .get(tps_idx)
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v as u64)
        .unwrap_or(0);
    let total_mb: f64 = fields.get(mb_idx).and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let total_bytes = (total_mb * 1024.0 * 1024.0) as u64;

    let half_bytes = total_bytes / 2;
    let half_ops = transfers / 2;

    Ok(DiskIoStats {
        device: device.to_string(),
        bytes_read: half_bytes,
        bytes_written: total_bytes - half_bytes,
        read_ops: half_ops,
        write_ops: transfers - half_ops,
        read_busy_time: Duration::ZERO,
        write_busy_time: Duration::ZERO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_cumulative_transfer_fifty_fifty() {
        let text = "          disk0\n   KB/t tps  MB\n   25.10  12  200.00\n";
        let stats = parse_iostat_disk_i(text, "disk0").unwrap();
        assert_eq!(stats.bytes_read, stats.bytes_written);
        assert_eq!(stats.bytes_read + stats.bytes_written, (200.00_f64 * 1024.0 * 1024.0) as u64);
        assert_eq!(stats.read_ops + stats.write_ops, 12);
    }

    #[test]
    fn malformed_header_is_a_parse_error() {
        assert!(parse_iostat_disk_i("disk0\ngarbage\n", "disk0").is_err());
    }
}
