//! Memory metrics via `GlobalMemoryStatusEx`.

use crate::{MemoryProvider, MemoryStats, Result, SwapStats};
use telemetry_metrics::Error;
use windows::Win32::System::Memory::{GlobalMemoryStatusEx, MEMORYSTATUSEX};

pub struct WindowsMemoryProvider;

fn query() -> Result<MEMORYSTATUSEX> {
    let mut status = MEMORYSTATUSEX {
        dwLength: std::mem::size_of::<MEMORYSTATUSEX>() as u32,
        ..Default::default()
    };
    unsafe { GlobalMemoryStatusEx(&mut status) }
        .map_err(|e| Error::io("memory.stats", std::io::Error::other(e.to_string())))?;
    Ok(status)
}

impl MemoryProvider for WindowsMemoryProvider {
    fn stats(&self) -> Result<MemoryStats> {
        let status = query()?;
        let total_bytes = status.ullTotalPhys;
        let free_bytes = status.ullAvailPhys;
        let used_bytes = total_bytes.saturating_sub(free_bytes);

        Ok(MemoryStats {
            total_bytes,
            used_bytes,
            free_bytes,
            available_bytes: free_bytes,
            cached_bytes: 0,
            buffers_bytes: 0,
            // dwMemoryLoad is already a 0-100 percent-used figure from the OS.
            used_percent: status.dwMemoryLoad as f64,
        })
    }

    fn swap_stats(&self) -> Result<SwapStats> {
        let status = query()?;
        // The page file total/available include physical RAM; subtracting
        // the physical totals isolates the swap-only portion. A host with
        // no page file can see the physical subtraction underflow, in which
        // case this reports zero swap rather than wrapping.
        let total_bytes = status.ullTotalPageFile.saturating_sub(status.ullTotalPhys);
        let free_bytes = status.ullAvailPageFile.saturating_sub(status.ullAvailPhys);
        let used_bytes = total_bytes.saturating_sub(free_bytes);
        let used_percent = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        };

        Ok(SwapStats {
            total_bytes,
            used_bytes,
            free_bytes,
            used_percent,
        })
    }
}
