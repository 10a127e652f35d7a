//! CPU metrics via `/proc/stat` and `/proc/cpuinfo`.

use crate::delta::RateTracker;
use crate::{CpuInfo, CpuProvider, Result};
use std::fs;
use telemetry_metrics::Error;
use telemetry_parse::{parse_loadavg, parse_stat_cpu_line, CpuTicks};

const PROC_STAT: &str = "/proc/stat";
const PROC_CPUINFO: &str = "/proc/cpuinfo";
const PROC_LOADAVG: &str = "/proc/loadavg";

pub struct AndroidCpuProvider {
    tracker: RateTracker,
}

impl AndroidCpuProvider {
    pub fn new() -> Self {
        Self {
            tracker: RateTracker::new(),
        }
    }

    fn read_ticks(&self) -> Result<Vec<CpuTicks>> {
        let content = fs::read_to_string(PROC_STAT).map_err(|e| Error::io("cpu.usage", e))?;
        content
            .lines()
            .filter(|line| line.starts_with("cpu"))
            .map(parse_stat_cpu_line)
            .collect()
    }
}

impl CpuProvider for AndroidCpuProvider {
    fn usage(&self) -> Result<Vec<f64>> {
        let ticks = self.read_ticks()?;
        Ok(ticks
            .iter()
            .filter(|t| t.index >= 0)
            .map(|t| self.tracker.percent(t.index, t.total(), t.busy()))
            .collect())
    }

    fn total_usage(&self) -> Result<f64> {
        let ticks = self.read_ticks()?;
        let aggregate = ticks
            .iter()
            .find(|t| t.index == -1)
            .ok_or_else(|| Error::parse("cpu.total_usage", "missing aggregate cpu line"))?;
        Ok(self.tracker.percent(-1, aggregate.total(), aggregate.busy()))
    }

    fn frequency(&self) -> Result<Vec<u64>> {
        let content = fs::read_to_string(PROC_CPUINFO).map_err(|e| Error::io("cpu.frequency", e))?;
        let mut freqs = Vec::new();
        for line in content.lines() {
            if let Some((key, value)) = line.split_once(':') {
                if key.trim() == "cpu MHz" {
                    let mhz: f64 = value.trim().parse().unwrap_or(0.0);
                    freqs.push(mhz.round() as u64);
                }
            }
        }
        Ok(freqs)
    }

    fn info(&self) -> Result<CpuInfo> {
        let content = fs::read_to_string(PROC_CPUINFO).map_err(|e| Error::io("cpu.info", e))?;
        let mut model = String::new();
        let mut vendor = String::new();
        let mut physical_ids = std::collections::HashSet::new();
        let mut logical_threads = 0u32;
        let mut cache_bytes = 0u64;

        for block in content.split("\n\n") {
            for line in block.lines() {
                let Some((key, value)) = line.split_once(':') else {
                    continue;
                };
                let key = key.trim();
                let value = value.trim();
                match key {
                    "model name" if model.is_empty() => model = value.to_string(),
                    "vendor_id" if vendor.is_empty() => vendor = value.to_string(),
                    "physical id" => {
                        physical_ids.insert(value.to_string());
                    }
                    "processor" => logical_threads += 1,
                    "cache size" if cache_bytes == 0 => {
                        if let Ok(kb) = value.trim_end_matches("KB").trim().parse::<u64>() {
                            cache_bytes = telemetry_parse::kb_to_bytes(kb).unwrap_or(0);
                        }
                    }
                    _ => {}
                }
            }
        }

        let physical_cores = if physical_ids.is_empty() {
            logical_threads
        } else {
            physical_ids.len() as u32
        };

        Ok(CpuInfo {
            model,
            vendor,
            physical_cores,
            logical_threads,
            cache_bytes,
        })
    }

    fn load_average(&self) -> Result<(f64, f64, f64)> {
        let content = fs::read_to_string(PROC_LOADAVG).map_err(|e| Error::io("cpu.load_average", e))?;
        parse_loadavg(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_usage_sample_is_zero_without_a_previous_reading() {
        let tracker = RateTracker::new();
        assert_eq!(tracker.percent(-1, 1000, 200), 0.0);
    }
}
