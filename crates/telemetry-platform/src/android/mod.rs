//! Android platform implementation
//!
//! Android exposes the same `/proc` and `/sys` surface as Linux, with
//! additional sysfs fallbacks for thermal zones and charge-counter-based
//! batteries that stock Linux distributions rarely need.

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

/// Android telemetry platform, backed by `/proc` and `/sys`.
pub struct AndroidPlatform {
    name: String,
    initialized: RwLock<bool>,
    cpu: cpu::AndroidCpuProvider,
    memory: memory::AndroidMemoryProvider,
    network: network::AndroidNetworkProvider,
    filesystem: filesystem::AndroidFilesystemProvider,
    battery: battery::AndroidBatteryProvider,
    sensors: sensors::AndroidSensorProvider,
}

impl AndroidPlatform {
    /// Build a new, uninitialized Android platform.
    pub fn new() -> Self {
        Self {
            name: "local".to_string(),
            initialized: RwLock::new(false),
            cpu: cpu::AndroidCpuProvider::new(),
            memory: memory::AndroidMemoryProvider,
            network: network::AndroidNetworkProvider,
            filesystem: filesystem::AndroidFilesystemProvider,
            battery: battery::AndroidBatteryProvider,
            sensors: sensors::AndroidSensorProvider,
        }
    }
}

impl Default for AndroidPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for AndroidPlatform {
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
