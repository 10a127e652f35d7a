//! Filesystem metrics via `GetLogicalDrives`, `GetVolumeInformationW`, and
//! `GetDiskFreeSpaceExW`.
//!
//! Disk I/O counters (`DiskIoStats`) have no Win32 API in this core's
//! external-interface contract (the spec names only the free-space and
//! volume-enumeration calls for Windows), so `disk_io` reports
//! `Unsupported` here rather than reaching for PDH `LogicalDisk` counters.

use crate::{DiskIoStats, FilesystemProvider, FilesystemStats, MountInfo, Result};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use telemetry_metrics::Error;
use windows::Win32::Storage::FileSystem::{
    GetDiskFreeSpaceExW, GetLogicalDrives, GetVolumeInformationW,
};
use windows::core::PCWSTR;

pub struct WindowsFilesystemProvider;

fn drive_letters() -> Vec<char> {
    let mask = unsafe { GetLogicalDrives() };
    (0..26).filter(|i| mask & (1 << i) != 0).map(|i| (b'A' + i as u8) as char).collect()
}

fn volume_info(root: &str) -> (String, Vec<u16>) {
    let mut fs_name = [0u16; 64];
    let root_wide: Vec<u16> = root.encode_utf16().chain(std::iter::once(0)).collect();
    let ok = unsafe {
        GetVolumeInformationW(
            PCWSTR(root_wide.as_ptr()),
            None,
            None,
            None,
            None,
            Some(&mut fs_name),
        )
    };
    let fs_type = if ok.is_ok() {
        let end = fs_name.iter().position(|&c| c == 0).unwrap_or(fs_name.len());
        OsString::from_wide(&fs_name[..end]).to_string_lossy().into_owned()
    } else {
        String::new()
    };
    (fs_type, root_wide)
}

impl FilesystemProvider for WindowsFilesystemProvider {
    fn mounts(&self) -> Result<Vec<MountInfo>> {
        Ok(drive_letters()
            .into_iter()
            .map(|letter| {
                let root = format!("{letter}:\\");
                let (fs_type, _) = volume_info(&root);
                MountInfo {
                    device: root.clone(),
                    mount_point: root,
                    fs_type,
                    options: Vec::new(),
                }
            })
            .collect())
    }

    fn stats(&self, mount_point: &str) -> Result<FilesystemStats> {
        let root_wide: Vec<u16> = mount_point.encode_utf16().chain(std::iter::once(0)).collect();
        let mut free_available = 0u64;
        let mut total = 0u64;
        let mut free_total = 0u64;

        let ok = unsafe {
            GetDiskFreeSpaceExW(
                PCWSTR(root_wide.as_ptr()),
                Some(&mut free_available),
                Some(&mut total),
                Some(&mut free_total),
            )
        };
        if ok.is_err() {
            return Err(Error::not_found("filesystem.stats", mount_point));
        }

        let used_bytes = total.saturating_sub(free_available);
        let used_percent = if total == 0 {
            0.0
        } else {
            (used_bytes as f64 / total as f64) * 100.0
        };

        Ok(FilesystemStats {
            total_bytes: total,
            used_bytes,
            free_bytes: free_total,
            used_percent,
            inodes_total: 0,
            inodes_used: 0,
            inodes_free: 0,
        })
    }

    fn disk_io(&self, _device: &str) -> Result<DiskIoStats> {
        Err(Error::unsupported("filesystem.disk_io"))
    }
}
