//! macOS (Darwin) platform implementation
//!
//! Collects system metrics via Mach host APIs, `sysctl`, `getmntinfo`/
//! `statfs`, `pmset`, and `iostat`.

mod battery;
mod cpu;
mod filesystem;
mod memory;
mod network;
mod sysctl;

use crate::{
    BatteryProvider, CancellationToken, CpuProvider, FilesystemProvider, MemoryProvider,
    NetworkProvider, Platform, Result, SensorProvider,
};
use parking_lot::RwLock;

/// macOS telemetry platform.
pub struct DarwinPlatform {
    name: String,
    initialized: RwLock<bool>,
    cpu: cpu::DarwinCpuProvider,
    memory: memory::DarwinMemoryProvider,
    network: network::DarwinNetworkProvider,
    filesystem: filesystem::DarwinFilesystemProvider,
    battery: battery::DarwinBatteryProvider,
}

impl DarwinPlatform {
    pub fn new() -> Self {
        Self {
            name: "local".to_string(),
            initialized: RwLock::new(false),
            cpu: cpu::DarwinCpuProvider::new(),
            memory: memory::DarwinMemoryProvider,
            network: network::DarwinNetworkProvider,
            filesystem: filesystem::DarwinFilesystemProvider,
            battery: battery::DarwinBatteryProvider,
        }
    }
}

impl Default for DarwinPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for DarwinPlatform {
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
        // Desktop Macs report a real count of 0 rather than a nil
        // capability -- the battery provider always exists.
        if *self.initialized.read() {
            Some(&self.battery)
        } else {
            Some(&crate::closed::ClosedBatteryProvider)
        }
    }

    fn sensors(&self) -> Option<&dyn SensorProvider> {
        // Reading SMC thermal sensors needs IOKit bindings beyond this
        // core's sysctl/Mach-port contract; not implemented.
        None
    }
}
