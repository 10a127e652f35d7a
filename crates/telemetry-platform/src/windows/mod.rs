//! Windows platform implementation
//!
//! Collects system metrics via PDH performance counters and the Win32 API.

mod battery;
mod filesystem;
mod identity;
mod memory;
mod network;
mod pdh;

use crate::{
    BatteryProvider, CancellationToken, CpuProvider, FilesystemProvider, MemoryProvider,
    NetworkProvider, Platform, Result, SensorProvider,
};
use parking_lot::RwLock;

/// Windows telemetry platform.
pub struct WindowsPlatform {
    name: String,
    initialized: RwLock<bool>,
    cpu: pdh::PdhCpuProvider,
    memory: memory::WindowsMemoryProvider,
    network: network::WindowsNetworkProvider,
    filesystem: filesystem::WindowsFilesystemProvider,
    battery: battery::WindowsBatteryProvider,
}

impl WindowsPlatform {
    pub fn new() -> Self {
        Self {
            name: "local".to_string(),
            initialized: RwLock::new(false),
            cpu: pdh::PdhCpuProvider::new(),
            memory: memory::WindowsMemoryProvider,
            network: network::WindowsNetworkProvider,
            filesystem: filesystem::WindowsFilesystemProvider,
            battery: battery::WindowsBatteryProvider,
        }
    }
}

impl Default for WindowsPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for WindowsPlatform {
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
        // No PDH counter catalog or WMI thermal zone is part of this core's
        // Windows contract (see spec's "any particular Windows PDH counter
        // catalog" non-goal).
        None
    }
}
