//! Memory metrics via `host_statistics64` VM page classes and `vm.swapusage`.

use super::sysctl;
use crate::{MemoryProvider, MemoryStats, Result, SwapStats};

pub struct DarwinMemoryProvider;

impl MemoryProvider for DarwinMemoryProvider {
    fn stats(&self) -> Result<MemoryStats> {
        let total_bytes = sysctl::memsize();
        let page_size = sysctl::pagesize();
        let counts = sysctl::vm_counts()?;

        let pages_to_bytes = |pages: u64| pages.saturating_mul(page_size);

        let used_bytes = pages_to_bytes(counts.active) + pages_to_bytes(counts.wired);
        let available_bytes = (pages_to_bytes(counts.free)
            + pages_to_bytes(counts.inactive)
            + pages_to_bytes(counts.speculative)
            + pages_to_bytes(counts.purgeable))
        .min(total_bytes);
        let used_bytes = used_bytes.min(total_bytes);
        let free_bytes = pages_to_bytes(counts.free);

        let used_percent = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        };

        Ok(MemoryStats {
            total_bytes,
            used_bytes,
            free_bytes,
            available_bytes,
            cached_bytes: 0,
            buffers_bytes: 0,
            used_percent,
        })
    }

    fn swap_stats(&self) -> Result<SwapStats> {
        let (total_bytes, used_bytes) = sysctl::swap_usage()?;
        let free_bytes = total_bytes.saturating_sub(used_bytes);
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
