//! telemetry-remote - SSH-backed `Platform` implementation
//!
//! Harvests the same six provider interfaces [`telemetry_metrics`] defines
//! by executing shell commands against a remote host over SSH and parsing
//! their stdout with [`telemetry_parse`], rather than reading local `/proc`
//! and `/sys`. See [`SshPlatform`] for the facade and [`config::SshConfig`]
//! for the connection parameters.

pub mod backoff;
pub mod config;
pub mod os_detect;
pub mod providers;
pub mod runner;
pub mod state;
pub mod transport;

use os_detect::RemoteOs;
use runner::CommandRunner;
use std::sync::{Arc, OnceLock};
use telemetry_metrics::{
    BatteryProvider, CancellationToken, ConnectionStats, CpuProvider, FilesystemProvider,
    MemoryProvider, NetworkProvider, Platform, Result, SensorProvider,
};
use transport::SshTransport;

/// A `Platform` backed by a single SSH connection. Every provider call
/// shells out over that connection; `initialize` dials, authenticates,
/// detects the remote OS, and wires up the matching provider set.
pub struct SshPlatform {
    name: String,
    transport: Arc<SshTransport>,
    cpu: OnceLock<Box<dyn CpuProvider>>,
    memory: OnceLock<Box<dyn MemoryProvider>>,
    network: OnceLock<Box<dyn NetworkProvider>>,
    filesystem: OnceLock<Box<dyn FilesystemProvider>>,
    sensors: OnceLock<Option<Box<dyn SensorProvider>>>,
}

impl SshPlatform {
    /// Build an unconnected platform for `config.host`. Call `initialize`
    /// before using any provider getter.
    pub fn new(config: config::SshConfig) -> Result<Self> {
        let host = config.host.clone();
        Ok(Self {
            name: host,
            transport: Arc::new(SshTransport::new(config)?),
            cpu: OnceLock::new(),
            memory: OnceLock::new(),
            network: OnceLock::new(),
            filesystem: OnceLock::new(),
            sensors: OnceLock::new(),
        })
    }

    /// Current SSH connection statistics (state, reconnect/session/keepalive
    /// counters, last error).
    pub fn connection_stats(&self) -> ConnectionStats {
        self.transport.stats()
    }

    /// The remote OS detected during `initialize`, or `None` beforehand.
    pub fn detected_os(&self) -> Option<RemoteOs> {
        self.transport.detected_os()
    }

    /// Register a callback invoked synchronously on every connection state
    /// transition. Must be called before `initialize` to observe the first
    /// `Disconnected -> Connecting` transition.
    pub fn on_state_change<F>(&self, callback: F)
    where
        F: Fn(telemetry_metrics::ConnectionState, telemetry_metrics::ConnectionState)
            + Send
            + Sync
            + 'static,
    {
        self.transport.on_state_change(callback);
    }

    fn wire_providers(&self, os: RemoteOs) {
        let runner: Arc<dyn CommandRunner> = self.transport.clone();
        match os {
            RemoteOs::Linux => {
                let _ = self
                    .cpu
                    .set(Box::new(providers::linux::RemoteLinuxCpuProvider::new(runner.clone())));
                let _ = self.memory.set(Box::new(
                    providers::linux::RemoteLinuxMemoryProvider::new(runner.clone()),
                ));
                let _ = self.network.set(Box::new(
                    providers::linux::RemoteLinuxNetworkProvider::new(runner.clone()),
                ));
                let _ = self.filesystem.set(Box::new(
                    providers::linux::RemoteLinuxFilesystemProvider::new(runner.clone()),
                ));
                let _ = self.sensors.set(Some(Box::new(
                    providers::linux::RemoteLinuxSensorProvider::new(runner),
                )));
            }
            RemoteOs::Darwin => {
                let _ = self
                    .cpu
                    .set(Box::new(providers::darwin::RemoteDarwinCpuProvider::new(runner.clone())));
                let _ = self.memory.set(Box::new(
                    providers::darwin::RemoteDarwinMemoryProvider::new(runner.clone()),
                ));
                let _ = self.network.set(Box::new(
                    providers::darwin::RemoteDarwinNetworkProvider::new(runner.clone()),
                ));
                let _ = self.filesystem.set(Box::new(
                    providers::darwin::RemoteDarwinFilesystemProvider::new(runner),
                ));
                // Remote sensor collection is only specified for Linux
                // hosts (spec §4.9); Darwin has no capability here.
                let _ = self.sensors.set(None);
            }
        }
    }
}

impl Platform for SshPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self, _cancellation: CancellationToken) -> Result<()> {
        let os = self.transport.connect()?;
        self.wire_providers(os);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.transport.close()
    }

    fn cpu(&self) -> &dyn CpuProvider {
        self.cpu
            .get()
            .expect("SshPlatform::cpu called before initialize")
            .as_ref()
    }

    fn memory(&self) -> &dyn MemoryProvider {
        self.memory
            .get()
            .expect("SshPlatform::memory called before initialize")
            .as_ref()
    }

    fn network(&self) -> &dyn NetworkProvider {
        self.network
            .get()
            .expect("SshPlatform::network called before initialize")
            .as_ref()
    }

    fn filesystem(&self) -> &dyn FilesystemProvider {
        self.filesystem
            .get()
            .expect("SshPlatform::filesystem called before initialize")
            .as_ref()
    }

    /// Always `None`: no remote battery provider is specified (spec §4.9
    /// enumerates CPU/Memory/Network/Filesystem/Sensors only).
    fn battery(&self) -> Option<&dyn BatteryProvider> {
        None
    }

    fn sensors(&self) -> Option<&dyn SensorProvider> {
        self.sensors
            .get()
            .expect("SshPlatform::sensors called before initialize")
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{AuthMethod, SshConfig};

    #[test]
    fn new_platform_is_named_after_its_host() {
        let config = SshConfig::new("example.com", "deploy", AuthMethod::Agent);
        let platform = SshPlatform::new(config).unwrap();
        assert_eq!(platform.name(), "example.com");
        assert_eq!(
            platform.connection_stats().state,
            telemetry_metrics::ConnectionState::Disconnected
        );
    }

    #[test]
    #[should_panic(expected = "called before initialize")]
    fn cpu_getter_panics_before_initialize() {
        let config = SshConfig::new("example.com", "deploy", AuthMethod::Agent);
        let platform = SshPlatform::new(config).unwrap();
        let _ = platform.cpu();
    }
}
