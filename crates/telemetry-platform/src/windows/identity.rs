//! Core counts and clock speed: `GetLogicalProcessorInformation` plus the
//! `~MHz` registry value every Windows build exposes per processor.

use std::mem;
use windows::Win32::System::Registry::{
    RegCloseKey, RegGetValueW, RegOpenKeyExW, HKEY, HKEY_LOCAL_MACHINE, KEY_READ, RRF_RT_REG_DWORD,
};
use windows::Win32::System::SystemInformation::{
    GetLogicalProcessorInformation, RelationProcessorCore, SYSTEM_LOGICAL_PROCESSOR_INFORMATION,
};
use windows::core::w;

/// `(physical_cores, logical_threads)` via `GetLogicalProcessorInformation`;
/// falls back to the process's available-parallelism hint if the syscall
/// fails (observed on some sandboxed/virtualized hosts).
pub fn core_counts() -> (u32, u32) {
    let mut len: u32 = 0;
    unsafe {
        let _ = GetLogicalProcessorInformation(None, &mut len);
    }
    if len == 0 {
        return fallback_counts();
    }

    let count = len as usize / mem::size_of::<SYSTEM_LOGICAL_PROCESSOR_INFORMATION>();
    let mut buf: Vec<SYSTEM_LOGICAL_PROCESSOR_INFORMATION> =
        vec![unsafe { mem::zeroed() }; count.max(1)];

    let ok = unsafe { GetLogicalProcessorInformation(Some(buf.as_mut_ptr()), &mut len) };
    if ok.is_err() {
        return fallback_counts();
    }

    let mut physical = 0u32;
    let mut logical = 0u32;
    for entry in &buf {
        if entry.Relationship == RelationProcessorCore {
            physical += 1;
            logical += entry.ProcessorMask.count_ones();
        }
    }
    if physical == 0 {
        return fallback_counts();
    }
    (physical, logical.max(physical))
}

fn fallback_counts() -> (u32, u32) {
    let threads = std::thread::available_parallelism().map(|n| n.get() as u32).unwrap_or(1);
    (threads, threads)
}

/// Base clock speed in MHz from
/// `HKLM\HARDWARE\DESCRIPTION\System\CentralProcessor\0\~MHz`.
pub fn processor_max_clock_mhz() -> Option<u64> {
    unsafe {
        let mut key = HKEY::default();
        let rc = RegOpenKeyExW(
            HKEY_LOCAL_MACHINE,
            w!(r"HARDWARE\DESCRIPTION\System\CentralProcessor\0"),
            Some(0),
            KEY_READ,
            &mut key,
        );
        if rc.is_err() {
            return None;
        }

        let mut value: u32 = 0;
        let mut value_len: u32 = mem::size_of::<u32>() as u32;
        let rc = RegGetValueW(
            key,
            None,
            w!("~MHz"),
            RRF_RT_REG_DWORD,
            None,
            Some(&mut value as *mut _ as *mut _),
            Some(&mut value_len),
        );
        let _ = RegCloseKey(key);

        if rc.is_err() {
            None
        } else {
            Some(value as u64)
        }
    }
}
