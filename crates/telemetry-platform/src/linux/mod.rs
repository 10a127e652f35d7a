//! Linux platform implementation
//!
//! Collects system telemetry via the `/proc` and `/sys` filesystems.

mod battery;
mod cpu;
mod filesystem;
mod memory;
mod network;
mod sensors;

use crate::{
    BatteryProvider, CancellationToken, CpuProvider, FilesystemProvider, MemoryProvider,
    NetworkProvider, Platform, Result, SensorProvider,
};
use parking_lot::RwLock;

/// Linux telemetry platform, backed by `/proc` and `/sys`.
pub struct LinuxPlatform {
    name: String,
    initialized: RwLock<bool>,
    cpu: cpu::LinuxCpuProvider,
    memory: memory::LinuxMemoryProvider,
    network: network::LinuxNetworkProvider,
    filesystem: filesystem::LinuxFilesystemProvider,
    battery: battery::LinuxBatteryProvider,
    sensors: sensors::LinuxSensorProvider,
}

impl LinuxPlatform {
    /// Build a new, uninitialized Linux platform.
    pub fn new() -> Self {
        Self {
            name: "local".to_string(),
            initialized: RwLock::new(false),
            cpu: cpu::LinuxCpuProvider::new(),
            memory: memory::LinuxMemoryProvider,
            network: network::LinuxNetworkProvider,
            filesystem: filesystem::LinuxFilesystemProvider,
            battery: battery::LinuxBatteryProvider,
            sensors: sensors::LinuxSensorProvider,
        }
    }
}

impl Default for LinuxPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for LinuxPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self, _cancellation: CancellationToken) -> Result<()> {
        *self.initialized.write() = true;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        *self.initialized.write() = false;
        Ok(())
    }

    fn cpu(&self) -> &dyn CpuProvider {
        if *self.initialized.read() {
            &self.cpu
        } else {
            &crate::closed::ClosedCpuProvider
        }
    }

    fn memory(&self) -> &dyn MemoryProvider {
        if *self.initialized.read() {
            &self.memory
        } else {
            &crate::closed::ClosedMemoryProvider
        }
    }

    fn network(&self) -> &dyn NetworkProvider {
        if *self.initialized.read() {
            &self.network
        } else {
            &crate::closed::ClosedNetworkProvider
        }
    }

    fn filesystem(&self) -> &dyn FilesystemProvider {
        if *self.initialized.read() {
            &self.filesystem
        } else {
            &crate::closed::ClosedFilesystemProvider
        }
    }

    fn battery(&self) -> Option<&dyn BatteryProvider> {
        if *self.initialized.read() {
            Some(&self.battery)
        } else {
            Some(&crate::closed::ClosedBatteryProvider)
        }
    }

    fn sensors(&self) -> Option<&dyn SensorProvider> {
        if *self.initialized.read() {
            Some(&self.sensors)
        } else {
            Some(&crate::closed::ClosedSensorProvider)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_error_before_initialize_and_after_close() {
        let platform = LinuxPlatform::new();
        assert!(platform.cpu().total_usage().is_err());

        platform.initialize(CancellationToken::new()).unwrap();
        platform.close().unwrap();
        assert!(platform.cpu().total_usage().is_err());
        assert!(platform.memory().stats().is_err());
        assert!(platform.battery().unwrap().count().is_err());
    }
}
