//! Provider stand-ins returned by a platform's getters once it has been
//! closed (or before it has been initialized). Every method returns
//! `Error::unsupported`, matching the [`telemetry_metrics::Platform`]
//! contract: "after `close` returns, provider calls return an error."
//!
//! Unlike `stub`, this module is compiled on every target -- each concrete
//! platform (`linux`, `darwin`, `windows`, `android`) needs it regardless of
//! which `#[cfg(target_os = "...")]` module is active.

use crate::{
    BatteryProvider, BatteryStats, CpuInfo, CpuProvider, DiskIoStats, Error, FilesystemProvider,
    FilesystemStats, MemoryProvider, MemoryStats, MountInfo, NetworkProvider, NetworkStats,
    Result, SensorProvider, SensorReading, SwapStats,
};

pub(crate) struct ClosedCpuProvider;

impl CpuProvider for ClosedCpuProvider {
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

pub(crate) struct ClosedMemoryProvider;

impl MemoryProvider for ClosedMemoryProvider {
    fn stats(&self) -> Result<MemoryStats> {
        Err(Error::unsupported("memory.stats"))
    }

    fn swap_stats(&self) -> Result<SwapStats> {
        Err(Error::unsupported("memory.swap_stats"))
    }
}

pub(crate) struct ClosedNetworkProvider;

impl NetworkProvider for ClosedNetworkProvider {
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

pub(crate) struct ClosedFilesystemProvider;

impl FilesystemProvider for ClosedFilesystemProvider {
    fn mounts(&self) -> Result<Vec<MountInfo>> {
        Err(Error::unsupported("filesystem.mounts"))
    }

    fn stats(&self, _mount_point: &str) -> Result<FilesystemStats> {
        Err(Error::unsupported("filesystem.stats"))
    }

    fn disk_io(&self, _device: &str) -> Result<DiskIoStats> {
        Err(Error::unsupported("filesystem.disk_io"))
    }
}

pub(crate) struct ClosedBatteryProvider;

impl BatteryProvider for ClosedBatteryProvider {
    fn count(&self) -> Result<u32> {
        Err(Error::unsupported("battery.count"))
    }

    fn stats(&self, _index: u32) -> Result<BatteryStats> {
        Err(Error::unsupported("battery.stats"))
    }
}

pub(crate) struct ClosedSensorProvider;

impl SensorProvider for ClosedSensorProvider {
    fn temperatures(&self) -> Result<Vec<SensorReading>> {
        Err(Error::unsupported("sensors.temperatures"))
    }

    fn fans(&self) -> Result<Vec<SensorReading>> {
        Err(Error::unsupported("sensors.fans"))
    }
}
