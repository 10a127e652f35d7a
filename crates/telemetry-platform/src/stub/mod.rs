//! Stub platform implementation for unsupported hosts
//!
//! Returns `Error::Unsupported` for every operation so that `telemetry-factory`
//! still has something to hand back on an OS this core has no provider for.

use crate::{
    BatteryProvider, CancellationToken, CpuInfo, CpuProvider, Error, FilesystemProvider,
    FilesystemStats, MemoryProvider, MemoryStats, MountInfo, NetworkProvider, NetworkStats,
    Platform, Result, SensorProvider, SwapStats,
};

/// Stub telemetry platform for hosts with no concrete provider set.
pub struct StubPlatform {
    name: String,
    cpu: StubCpuProvider,
    memory: StubMemoryProvider,
    network: StubNetworkProvider,
    filesystem: StubFilesystemProvider,
}

impl StubPlatform {
    pub fn new() -> Self {
        Self {
            name: "unsupported".to_string(),
            cpu: StubCpuProvider,
            memory: StubMemoryProvider,
            network: StubNetworkProvider,
            filesystem: StubFilesystemProvider,
        }
    }
}

impl Default for StubPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for StubPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self, _cancellation: CancellationToken) -> Result<()> {
        Err(Error::unsupported("platform.initialize"))
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn cpu(&self) -> &dyn CpuProvider {
        &self.cpu
    }

    fn memory(&self) -> &dyn MemoryProvider {
        &self.memory
    }

    fn network(&self) -> &dyn NetworkProvider {
        &self.network
    }

    fn filesystem(&self) -> &dyn FilesystemProvider {
        &self.filesystem
    }

    fn battery(&self) -> Option<&dyn BatteryProvider> {
        None
    }

    fn sensors(&self) -> Option<&dyn SensorProvider> {
        None
    }
}

struct StubCpuProvider;

impl CpuProvider for StubCpuProvider {
    fn usage(&self) -> Result<Vec<f64>> {
        Err(Error::unsupported("cpu.usage"))
    }

    fn total_usage(&self) -> Result<f64> {
        Err(Error::unsupported("cpu.total_usage"))
    }

    fn frequency(&self) -> Result<Vec<u64>> {
        Err(Error::unsupported("cpu.frequency"))
    }

    fn info(&self) -> Result<CpuInfo> {
        Err(Error::unsupported("cpu.info"))
    }

    fn load_average(&self) -> Result<(f64, f64, f64)> {
        Err(Error::unsupported("cpu.load_average"))
    }
}

struct StubMemoryProvider;

impl MemoryProvider for StubMemoryProvider {
    fn stats(&self) -> Result<MemoryStats> {
        Err(Error::unsupported("memory.stats"))
    }

    fn swap_stats(&self) -> Result<SwapStats> {
        Err(Error::unsupported("memory.swap_stats"))
    }
}

struct StubNetworkProvider;

impl NetworkProvider for StubNetworkProvider {
    fn interfaces(&self) -> Result<Vec<String>> {
        Err(Error::unsupported("network.interfaces"))
    }

    fn stats(&self, _name: &str) -> Result<NetworkStats> {
        Err(Error::unsupported("network.stats"))
    }

    fn all_stats(&self) -> Result<Vec<NetworkStats>> {
        Err(Error::unsupported("network.all_stats"))
    }
}

struct StubFilesystemProvider;

impl FilesystemProvider for StubFilesystemProvider {
    fn mounts(&self) -> Result<Vec<MountInfo>> {
        Err(Error::unsupported("filesystem.mounts"))
    }

    fn stats(&self, _path: &str) -> Result<FilesystemStats> {
        Err(Error::unsupported("filesystem.stats"))
    }

    fn disk_io(&self, _device: &str) -> Result<crate::DiskIoStats> {
        Err(Error::unsupported("filesystem.disk_io"))
    }
}
