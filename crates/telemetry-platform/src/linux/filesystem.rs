//! Filesystem and disk metrics via `/proc/mounts`, `statvfs(2)`, and
//! `/proc/diskstats`.

use crate::{DiskIoStats, FilesystemProvider, FilesystemStats, MountInfo, Result};
use std::ffi::CString;
use std::fs;
use std::mem;
use telemetry_metrics::Error;
use telemetry_parse::{parse_diskstats_line, parse_mounts};

const PROC_MOUNTS: &str = "/proc/mounts";
const PROC_DISKSTATS: &str = "/proc/diskstats";

pub struct LinuxFilesystemProvider;

impl FilesystemProvider for LinuxFilesystemProvider {
    fn mounts(&self) -> Result<Vec<MountInfo>> {
        let content = fs::read_to_string(PROC_MOUNTS).map_err(|e| Error::io("filesystem.mounts", e))?;
        Ok(parse_mounts(&content))
    }

    fn stats(&self, mount_point: &str) -> Result<FilesystemStats> {
        let path = CString::new(mount_point)
            .map_err(|e| Error::parse("filesystem.stats", format!("invalid path: {e}")))?;

        let mut buf: libc::statvfs = unsafe { mem::zeroed() };
        let rc = unsafe { libc::statvfs(path.as_ptr(), &mut buf) };
        if rc != 0 {
            return Err(Error::not_found("filesystem.stats", mount_point));
        }

        let block_size = buf.f_frsize as u64;
        let total_bytes = (buf.f_blocks as u64).saturating_mul(block_size);
        let free_bytes = (buf.f_bfree as u64).saturating_mul(block_size);
        let available_for_used = (buf.f_bavail as u64).saturating_mul(block_size);
        let used_bytes = total_bytes.saturating_sub(available_for_used);
        let used_percent = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        };

        Ok(FilesystemStats {
            total_bytes,
            used_bytes,
            free_bytes,
            used_percent,
            inodes_total: buf.f_files as u64,
            inodes_used: (buf.f_files as u64).saturating_sub(buf.f_ffree as u64),
            inodes_free: buf.f_ffree as u64,
        })
    }

    fn disk_io(&self, device: &str) -> Result<DiskIoStats> {
        let content =
            fs::read_to_string(PROC_DISKSTATS).map_err(|e| Error::io("filesystem.disk_io", e))?;
        content
            .lines()
            .map(parse_diskstats_line)
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .find(|s| s.device == device)
            .ok_or_else(|| Error::not_found("filesystem.disk_io", device))
    }
}
