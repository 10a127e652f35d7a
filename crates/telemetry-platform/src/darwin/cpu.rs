//! CPU metrics via `host_processor_info` and `hw.*`/`machdep.cpu.*` sysctl MIBs.

use super::sysctl;
use crate::delta::RateTracker;
use crate::{CpuInfo, CpuProvider, Result};

pub struct DarwinCpuProvider {
    tracker: RateTracker,
}

impl DarwinCpuProvider {
    pub fn new() -> Self {
        Self { tracker: RateTracker::new() }
    }
}

impl CpuProvider for DarwinCpuProvider {
    fn usage(&self) -> Result<Vec<f64>> {
        let cores = sysctl::cpu_times()?;
        Ok(cores
            .iter()
            .enumerate()
            .map(|(i, t)| self.tracker.percent(i as i32, t.total(), t.busy()))
            .collect())
    }

    fn total_usage(&self) -> Result<f64> {
        let cores = sysctl::cpu_times()?;
        let total: u64 = cores.iter().map(|t| t.total()).sum();
        let busy: u64 = cores.iter().map(|t| t.busy()).sum();
        Ok(self.tracker.percent(-1, total, busy))
    }

    fn frequency(&self) -> Result<Vec<u64>> {
        let mhz = sysctl::cpu_frequency_mhz();
        let (_, _, _, logical_threads, _) = sysctl::cpu_info()?;
        // Per-core frequency isn't exposed on Apple Silicon or recent Intel
        // Macs; the spec's fallback is to replicate the base frequency
        // across every logical thread.
        Ok(vec![mhz; logical_threads.max(1) as usize])
    }

    fn info(&self) -> Result<CpuInfo> {
        let (model, vendor, physical_cores, logical_threads, cache_bytes) = sysctl::cpu_info()?;
        Ok(CpuInfo {
            model,
            vendor,
            physical_cores,
            logical_threads,
            cache_bytes,
        })
    }

    fn load_average(&self) -> Result<(f64, f64, f64)> {
        sysctl::load_average()
    }
}
