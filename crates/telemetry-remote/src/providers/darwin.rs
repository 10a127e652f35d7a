//! Remote Darwin providers: the same `sysctl`/`vm_stat`/`iostat`/`netstat`
//! commands a local shell session on the remote Mac would run, parsed with
//! the shared [`telemetry_parse`] BSD-format helpers.

use crate::runner::CommandRunner;
use std::sync::Arc;
use telemetry_metrics::{
    CpuInfo, CpuProvider, DiskIoStats, Error, FilesystemProvider, FilesystemStats, MemoryProvider,
    MemoryStats, MountInfo, NetworkProvider, NetworkStats, Result, SwapStats,
};
use telemetry_parse::{
    parse_df_inodes, parse_df_space, parse_mount_output, parse_netstat_ib,
    parse_netstat_interface_list, parse_swapusage, parse_vm_stat, shell_quote, validate_path,
};

/// Parse `sysctl -n vm.loadavg`'s brace-wrapped triple, e.g.
/// `"{ 1.50 2.00 2.50 }"`.
fn parse_sysctl_loadavg(content: &str) -> Result<(f64, f64, f64)> {
    let inner = content.trim().trim_start_matches('{').trim_end_matches('}');
    let mut fields = inner.split_whitespace();
    let parse = |s: Option<&str>| {
        s.and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| Error::parse("vm.loadavg", "malformed sysctl output"))
    };
    Ok((parse(fields.next())?, parse(fields.next())?, parse(fields.next())?))
}

/// Parse `iostat -c 2`'s final row, returning `100 - id` (percent busy).
/// `iostat` already averages over the sample window, so -- unlike the
/// jiffy-counter based Linux CPU provider -- no local rate tracker is
/// needed; the command itself did the differencing.
fn parse_iostat_busy_percent(content: &str) -> Result<f64> {
    let last = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| Error::parse("iostat", "empty output"))?;
    let fields: Vec<&str> = last.split_whitespace().collect();
    // Columns are `KB/t tps MB/s us sy id 1m 5m 15m`; idle is column index 5.
    let idle: f64 = fields
        .get(5)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::parse("iostat", "missing idle column"))?;
    Ok((100.0 - idle).clamp(0.0, 100.0))
}

pub struct RemoteDarwinCpuProvider {
    runner: Arc<dyn CommandRunner>,
}

impl RemoteDarwinCpuProvider {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn sysctl_n(&self, mib: &str) -> Result<String> {
        self.runner.run(&format!("sysctl -n {mib}"))
    }
}

impl CpuProvider for RemoteDarwinCpuProvider {
    fn usage(&self) -> Result<Vec<f64>> {
        // `iostat` on macOS reports one aggregate figure, not per-core; the
        // aggregate is replicated across the logical thread count, mirroring
        // the local Darwin provider's frequency fallback.
        let pct = self.total_usage()?;
        let threads: u32 = self
            .sysctl_n("hw.logicalcpu")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1);
        Ok(vec![pct; threads.max(1) as usize])
    }

    fn total_usage(&self) -> Result<f64> {
        let output = self.runner.run("iostat -c 2 | tail -n 1")?;
        parse_iostat_busy_percent(&output)
    }

    fn frequency(&self) -> Result<Vec<u64>> {
        Err(Error::unsupported("cpu.frequency"))
    }

    fn info(&self) -> Result<CpuInfo> {
        let model = self.sysctl_n("machdep.cpu.brand_string").unwrap_or_default();
        let physical_cores: u32 = self
            .sysctl_n("hw.physicalcpu")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);
        let logical_threads: u32 = self
            .sysctl_n("hw.logicalcpu")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);
        let cache_bytes: u64 = self
            .sysctl_n("hw.l3cachesize")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .or_else(|| {
                self.sysctl_n("hw.l2cachesize")
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
            })
            .unwrap_or(0);

        Ok(CpuInfo {
            model: model.trim().to_string(),
            vendor: "Apple".to_string(),
            physical_cores,
            logical_threads,
            cache_bytes,
        })
    }

    fn load_average(&self) -> Result<(f64, f64, f64)> {
        let output = self.sysctl_n("vm.loadavg")?;
        parse_sysctl_loadavg(&output)
    }
}

pub struct RemoteDarwinMemoryProvider {
    runner: Arc<dyn CommandRunner>,
}

impl RemoteDarwinMemoryProvider {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl MemoryProvider for RemoteDarwinMemoryProvider {
    fn stats(&self) -> Result<MemoryStats> {
        let total_bytes: u64 = self
            .runner
            .run("sysctl -n hw.memsize")?
            .trim()
            .parse()
            .map_err(|_| Error::parse("memory.stats", "bad hw.memsize value"))?;

        let vm_stat_output = self.runner.run("vm_stat")?;
        let counts = parse_vm_stat(&vm_stat_output)?;
        let page_size = if counts.page_size > 0 { counts.page_size } else { 4096 };

        let used_bytes = (counts.active + counts.wired) * page_size;
        let available_bytes = ((counts.free + counts.inactive + counts.speculative + counts.purgeable)
            * page_size)
            .min(total_bytes);
        let used_percent = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64 * 100.0).clamp(0.0, 100.0)
        };

        Ok(MemoryStats {
            total_bytes,
            used_bytes: used_bytes.min(total_bytes),
            free_bytes: counts.free * page_size,
            available_bytes,
            cached_bytes: 0,
            buffers_bytes: 0,
            used_percent,
        })
    }

    fn swap_stats(&self) -> Result<SwapStats> {
        let output = self.runner.run("sysctl -n vm.swapusage")?;
        let (total_bytes, used_bytes) = parse_swapusage(&output)?;
        if total_bytes == 0 {
            return Ok(SwapStats::default());
        }
        let free_bytes = total_bytes.saturating_sub(used_bytes);
        Ok(SwapStats {
            total_bytes,
            used_bytes,
            free_bytes,
            used_percent: (used_bytes as f64 / total_bytes as f64 * 100.0).clamp(0.0, 100.0),
        })
    }
}

pub struct RemoteDarwinNetworkProvider {
    runner: Arc<dyn CommandRunner>,
}

impl RemoteDarwinNetworkProvider {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl NetworkProvider for RemoteDarwinNetworkProvider {
    fn interfaces(&self) -> Result<Vec<String>> {
        let output = self.runner.run("netstat -i")?;
        Ok(parse_netstat_interface_list(&output))
    }

    fn stats(&self, name: &str) -> Result<NetworkStats> {
        validate_path(name).map_err(|_| Error::not_found("network.stats", name))?;
        let output = self.runner.run(&format!("netstat -ib -I {}", shell_quote(name)))?;
        let counters = parse_netstat_ib(&output)?;
        Ok(NetworkStats {
            interface: name.to_string(),
            rx_bytes: counters.rx_bytes,
            rx_packets: counters.rx_packets,
            rx_errors: counters.rx_errors,
            rx_drops: 0,
            tx_bytes: counters.tx_bytes,
            tx_packets: counters.tx_packets,
            tx_errors: counters.tx_errors,
            tx_drops: 0,
        })
    }

    fn all_stats(&self) -> Result<Vec<NetworkStats>> {
        Ok(self
            .interfaces()?
            .into_iter()
            .filter_map(|name| self.stats(&name).ok())
            .collect())
    }
}

pub struct RemoteDarwinFilesystemProvider {
    runner: Arc<dyn CommandRunner>,
}

impl RemoteDarwinFilesystemProvider {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl FilesystemProvider for RemoteDarwinFilesystemProvider {
    fn mounts(&self) -> Result<Vec<MountInfo>> {
        let output = self.runner.run("mount")?;
        Ok(parse_mount_output(&output))
    }

    fn stats(&self, mount_point: &str) -> Result<FilesystemStats> {
        validate_path(mount_point)?;
        let quoted = shell_quote(mount_point);

        let space_output = self.runner.run(&format!("df -k {quoted}"))?;
        let space = parse_df_space(&space_output)?;
        let inode_output = self.runner.run(&format!("df -i {quoted}"))?;
        let inodes = parse_df_inodes(&inode_output)?;

        let total_bytes = space.total_blocks.saturating_mul(1024);
        let used_bytes = space.used_blocks.saturating_mul(1024);
        let used_percent = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64 * 100.0).clamp(0.0, 100.0)
        };

        Ok(FilesystemStats {
            total_bytes,
            used_bytes,
            free_bytes: space.available_blocks.saturating_mul(1024),
            used_percent,
            inodes_total: inodes.total,
            inodes_used: inodes.used,
            inodes_free: inodes.free,
        })
    }

    /// Remote Darwin has no `/proc/diskstats` equivalent reachable by a
    /// plain shell command without elevated privileges; per the spec's
    /// §4.9 note, this surfaces `Unsupported` rather than guessing.
    fn disk_io(&self, _device: &str) -> Result<DiskIoStats> {
        Err(Error::unsupported("filesystem.disk_io"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::test_support::FakeRunner;

    #[test]
    fn load_average_parses_the_brace_wrapped_triple() {
        let runner = Arc::new(FakeRunner::new());
        runner.set("sysctl -n vm.loadavg", "{ 1.50 2.00 2.50 }\n");
        let provider = RemoteDarwinCpuProvider::new(runner);
        assert_eq!(provider.load_average().unwrap(), (1.50, 2.00, 2.50));
    }

    #[test]
    fn total_usage_reads_the_idle_column_from_iostat() {
        let runner = Arc::new(FakeRunner::new());
        runner.set(
            "iostat -c 2 | tail -n 1",
            "          disk0       cpu     load average\n\
KB/t  tps  MB/s  us sy id   1m   5m   15m\n\
 20.1   5  0.10   5  3 92  1.50 2.00 2.50\n",
        );
        let provider = RemoteDarwinCpuProvider::new(runner);
        assert!((provider.total_usage().unwrap() - 8.0).abs() < 0.01);
    }

    #[test]
    fn disk_io_is_unsupported_on_remote_darwin() {
        let runner = Arc::new(FakeRunner::new());
        let provider = RemoteDarwinFilesystemProvider::new(runner);
        assert!(matches!(
            provider.disk_io("disk0").unwrap_err(),
            Error::Unsupported { .. }
        ));
    }

    #[test]
    fn mounts_drops_devfs_entries() {
        let runner = Arc::new(FakeRunner::new());
        runner.set(
            "mount",
            "/dev/disk1s1 on / (apfs, local, journaled)\ndevfs on /dev (devfs, local, nobrowse)\n",
        );
        let provider = RemoteDarwinFilesystemProvider::new(runner);
        let mounts = provider.mounts().unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_point, "/");
    }
}
