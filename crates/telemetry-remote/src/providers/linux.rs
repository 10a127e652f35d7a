//! Remote Linux providers: the same `/proc` files the local Linux providers
//! read, delivered over `cat` instead of `std::fs::read_to_string`, parsed
//! with the exact same [`telemetry_parse`] helpers.

use crate::runner::CommandRunner;
use std::sync::Arc;
use telemetry_metrics::{
    CpuInfo, CpuProvider, DiskIoStats, Error, FilesystemProvider, FilesystemStats, MemoryProvider,
    MemoryStats, MountInfo, NetworkProvider, NetworkStats, Result, SensorProvider, SensorReading,
    SwapStats,
};
use telemetry_parse::{
    parse_diskstats_line, parse_loadavg, parse_meminfo, parse_mounts, parse_net_dev,
    parse_stat_cpu_line, shell_quote, validate_path, CpuTicks,
};
use telemetry_platform::delta::RateTracker;

pub struct RemoteLinuxCpuProvider {
    runner: Arc<dyn CommandRunner>,
    tracker: RateTracker,
}

impl RemoteLinuxCpuProvider {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            tracker: RateTracker::new(),
        }
    }

    fn aggregate_ticks(&self) -> Result<CpuTicks> {
        let output = self.runner.run("cat /proc/stat | head -1")?;
        parse_stat_cpu_line(output.trim())
    }

    fn per_core_ticks(&self) -> Result<Vec<CpuTicks>> {
        let output = self.runner.run("cat /proc/stat | grep '^cpu[0-9]'")?;
        output.lines().map(parse_stat_cpu_line).collect()
    }
}

impl CpuProvider for RemoteLinuxCpuProvider {
    fn usage(&self) -> Result<Vec<f64>> {
        let ticks = self.per_core_ticks()?;
        Ok(ticks
            .iter()
            .map(|t| self.tracker.percent(t.index, t.total(), t.busy()))
            .collect())
    }

    fn total_usage(&self) -> Result<f64> {
        let ticks = self.aggregate_ticks()?;
        Ok(self.tracker.percent(-1, ticks.total(), ticks.busy()))
    }

    fn frequency(&self) -> Result<Vec<u64>> {
        Err(Error::unsupported("cpu.frequency"))
    }

    fn info(&self) -> Result<CpuInfo> {
        let output = self.runner.run("cat /proc/cpuinfo")?;
        let mut model = String::new();
        let mut vendor = String::new();
        let mut physical_ids = std::collections::HashSet::new();
        let mut logical_threads = 0u32;
        let mut cache_bytes = 0u64;

        for block in output.split("\n\n") {
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
        let output = self.runner.run("cat /proc/loadavg")?;
        parse_loadavg(&output)
    }
}

pub struct RemoteLinuxMemoryProvider {
    runner: Arc<dyn CommandRunner>,
}

impl RemoteLinuxMemoryProvider {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn read(&self) -> Result<(MemoryStats, SwapStats)> {
        let output = self.runner.run("cat /proc/meminfo")?;
        parse_meminfo(&output)
    }
}

impl MemoryProvider for RemoteLinuxMemoryProvider {
    fn stats(&self) -> Result<MemoryStats> {
        Ok(self.read()?.0)
    }

    fn swap_stats(&self) -> Result<SwapStats> {
        Ok(self.read()?.1)
    }
}

pub struct RemoteLinuxNetworkProvider {
    runner: Arc<dyn CommandRunner>,
}

impl RemoteLinuxNetworkProvider {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn read_all(&self) -> Result<Vec<NetworkStats>> {
        let output = self.runner.run("cat /proc/net/dev")?;
        parse_net_dev(&output)
    }
}

impl NetworkProvider for RemoteLinuxNetworkProvider {
    fn interfaces(&self) -> Result<Vec<String>> {
        Ok(self.read_all()?.into_iter().map(|s| s.interface).collect())
    }

    fn stats(&self, name: &str) -> Result<NetworkStats> {
        self.read_all()?
            .into_iter()
            .find(|s| s.interface == name)
            .ok_or_else(|| Error::not_found("network.stats", name))
    }

    fn all_stats(&self) -> Result<Vec<NetworkStats>> {
        self.read_all()
    }
}

pub struct RemoteLinuxFilesystemProvider {
    runner: Arc<dyn CommandRunner>,
}

impl RemoteLinuxFilesystemProvider {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl FilesystemProvider for RemoteLinuxFilesystemProvider {
    fn mounts(&self) -> Result<Vec<MountInfo>> {
        let output = self.runner.run("cat /proc/mounts")?;
        Ok(parse_mounts(&output))
    }

    fn stats(&self, mount_point: &str) -> Result<FilesystemStats> {
        validate_path(mount_point)?;
        let quoted = shell_quote(mount_point);

        let space_output = self
            .runner
            .run(&format!("df -B1 {quoted}"))
            .or_else(|_| self.runner.run(&format!("df -k {quoted}")))?;
        let space = telemetry_parse::parse_df_space(&space_output)?;
        let is_kib = !space_output.contains("1B-blocks");
        let block_size = if is_kib { 1024 } else { 1 };

        let inode_output = self.runner.run(&format!("df -i {quoted}"))?;
        let inodes = telemetry_parse::parse_df_inodes(&inode_output)?;

        let total_bytes = space.total_blocks.saturating_mul(block_size);
        let available_bytes = space.available_blocks.saturating_mul(block_size);
        let used_bytes = total_bytes.saturating_sub(available_bytes);
        let used_percent = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        };

        Ok(FilesystemStats {
            total_bytes,
            used_bytes,
            free_bytes: available_bytes,
            used_percent,
            inodes_total: inodes.total,
            inodes_used: inodes.used,
            inodes_free: inodes.free,
        })
    }

    fn disk_io(&self, device: &str) -> Result<DiskIoStats> {
        let output = self.runner.run("cat /proc/diskstats")?;
        output
            .lines()
            .map(parse_diskstats_line)
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .find(|s| s.device == device)
            .ok_or_else(|| Error::not_found("filesystem.disk_io", device))
    }
}

pub struct RemoteLinuxSensorProvider {
    runner: Arc<dyn CommandRunner>,
}

impl RemoteLinuxSensorProvider {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn read_kind(&self, kind: &str, unit: &str, scale: f64) -> Result<Vec<SensorReading>> {
        let list = self
            .runner
            .run(&format!("find /sys/class/hwmon -name '{kind}*_input'"))?;

        let mut out = Vec::new();
        for path in list.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if validate_path(path).is_err() {
                continue;
            }
            let Ok(raw) = self.runner.run(&format!("cat {}", shell_quote(path))) else {
                continue;
            };
            let Ok(value) = raw.trim().parse::<f64>() else {
                continue;
            };

            let device = path
                .strip_prefix("/sys/class/hwmon/")
                .and_then(|rest| rest.split('/').next())
                .unwrap_or("hwmon")
                .to_string();
            let label = path
                .rsplit('/')
                .next()
                .and_then(|f| f.strip_suffix("_input"))
                .unwrap_or(kind)
                .to_string();

            out.push(SensorReading {
                device,
                label,
                value: value * scale,
                unit: unit.to_string(),
                critical: 0.0,
            });
        }
        Ok(out)
    }
}

impl SensorProvider for RemoteLinuxSensorProvider {
    fn temperatures(&self) -> Result<Vec<SensorReading>> {
        self.read_kind("temp", "°C", 0.001)
    }

    fn fans(&self) -> Result<Vec<SensorReading>> {
        self.read_kind("fan", "RPM", 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::test_support::FakeRunner;

    #[test]
    fn total_usage_is_zero_on_first_sample() {
        let runner = Arc::new(FakeRunner::new());
        runner.set(
            "cat /proc/stat | head -1",
            "cpu  10132153 290696 3084719 46828483 16683 0 25195 0 175628 0\n",
        );
        let provider = RemoteLinuxCpuProvider::new(runner);
        assert_eq!(provider.total_usage().unwrap(), 0.0);
    }

    #[test]
    fn load_average_parses_the_remote_loadavg_line() {
        let runner = Arc::new(FakeRunner::new());
        runner.set("cat /proc/loadavg", "1.50 2.00 2.50 1/200 12345\n");
        let provider = RemoteLinuxCpuProvider::new(runner);
        assert_eq!(provider.load_average().unwrap(), (1.50, 2.00, 2.50));
    }

    #[test]
    fn filesystem_stats_uses_b1_blocks_when_available() {
        let runner = Arc::new(FakeRunner::new());
        runner.set(
            "df -B1 '/'",
            "Filesystem     1B-blocks       Used  Available Use% Mounted on\n\
/dev/sda1      107374182400 53687091200 53687091200  50% /\n",
        );
        runner.set(
            "df -i '/'",
            "Filesystem      Inodes   IUsed    IFree IUse% Mounted on\n\
/dev/sda1      6553600  234567  6319033    4% /\n",
        );
        let provider = RemoteLinuxFilesystemProvider::new(runner);
        let stats = provider.stats("/").unwrap();
        assert_eq!(stats.total_bytes, 107374182400);
        assert_eq!(stats.inodes_total, 6553600);
    }

    #[test]
    fn filesystem_stats_rejects_unsafe_mount_points() {
        let runner = Arc::new(FakeRunner::new());
        let provider = RemoteLinuxFilesystemProvider::new(runner);
        assert!(provider.stats("/mnt/$(whoami)").is_err());
    }
}
