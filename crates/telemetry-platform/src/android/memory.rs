//! Memory metrics via `/proc/meminfo`.

use crate::{MemoryProvider, MemoryStats, Result, SwapStats};
use std::fs;
use telemetry_metrics::Error;
use telemetry_parse::parse_meminfo;

const PROC_MEMINFO: &str = "/proc/meminfo";

pub struct AndroidMemoryProvider;

impl MemoryProvider for AndroidMemoryProvider {
    fn stats(&self) -> Result<MemoryStats> {
        let content = fs::read_to_string(PROC_MEMINFO).map_err(|e| Error::io("memory.stats", e))?;
        let (memory, _) = parse_meminfo(&content)?;
        Ok(memory)
    }

    fn swap_stats(&self) -> Result<SwapStats> {
        let content =
            fs::read_to_string(PROC_MEMINFO).map_err(|e| Error::io("memory.swap_stats", e))?;
        let (_, swap) = parse_meminfo(&content)?;
        Ok(swap)
    }
}
