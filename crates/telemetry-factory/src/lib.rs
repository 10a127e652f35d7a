//! telemetry-factory - platform registry
//!
//! Picks the concrete [`Platform`] implementation for a host: the
//! compiled-in local provider set for the OS this binary runs on, or an
//! SSH-backed platform wired up from a [`RemoteConfig`].
//!
//! The host project selects platform code per-file with build tags
//! (`//go:build linux`, `//go:build darwin`, ...); here that becomes a
//! runtime sum type, [`PlatformKind`], so one dispatcher -- not the
//! compiler picking among source files -- selects the backend.

use telemetry_metrics::Platform;

pub use telemetry_remote::config::{AuthMethod, HostKeyPolicy, ReconnectConfig, SshConfig as RemoteConfig};
pub use telemetry_remote::os_detect::RemoteOs;
pub use telemetry_remote::SshPlatform;

/// Which concrete backend a [`Platform`] trait object is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    /// Local Linux, via `/proc` and `/sys`.
    Linux,
    /// Local macOS, via Mach host APIs and `sysctl`.
    Darwin,
    /// Local Windows, via PDH counters and Win32 calls.
    Windows,
    /// Local Android, Linux-shaped with extra sysfs fallbacks.
    Android,
    /// Remote Linux, reached over SSH.
    SshLinux,
    /// Remote macOS, reached over SSH.
    SshDarwin,
    /// No provider set exists for the host OS; every call returns
    /// `Error::Unsupported`. Not part of the spec's enumerated backend set,
    /// but needed so `local_platform` has something to return on an
    /// unrecognized compile target rather than failing to build.
    Unsupported,
}

/// Build the local platform for the OS this binary was compiled for,
/// alongside the [`PlatformKind`] that was selected.
pub fn local_platform() -> (PlatformKind, Box<dyn Platform>) {
    let kind = local_kind();
    log::debug!("selected local platform backend: {kind:?}");
    (kind, Box::new(telemetry_platform::new_local_platform()))
}

/// Build an SSH-backed remote platform from `config`. The concrete provider
/// set (Linux or Darwin shell commands) is wired up during
/// [`Platform::initialize`], once the remote OS has been detected or the
/// config's forced override is honored; query [`SshPlatform::detected_os`]
/// (mapped through [`remote_kind`]) afterwards to find out which.
pub fn remote_platform(config: RemoteConfig) -> telemetry_metrics::Result<Box<dyn Platform>> {
    log::debug!("wiring remote platform for host {}", config.host);
    Ok(Box::new(SshPlatform::new(config)?))
}

/// Map a connected [`SshPlatform`]'s detected remote OS to a [`PlatformKind`].
/// Returns `None` if `initialize` has not yet run.
pub fn remote_kind(platform: &SshPlatform) -> Option<PlatformKind> {
    platform.detected_os().map(|os| match os {
        RemoteOs::Linux => PlatformKind::SshLinux,
        RemoteOs::Darwin => PlatformKind::SshDarwin,
    })
}

#[cfg(target_os = "linux")]
fn local_kind() -> PlatformKind {
    PlatformKind::Linux
}

#[cfg(target_os = "macos")]
fn local_kind() -> PlatformKind {
    PlatformKind::Darwin
}

#[cfg(target_os = "windows")]
fn local_kind() -> PlatformKind {
    PlatformKind::Windows
}

#[cfg(target_os = "android")]
fn local_kind() -> PlatformKind {
    PlatformKind::Android
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "windows",
    target_os = "android"
)))]
fn local_kind() -> PlatformKind {
    PlatformKind::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_platform_reports_a_kind_matching_the_compiled_target() {
        let (kind, platform) = local_platform();
        #[cfg(target_os = "linux")]
        assert_eq!(kind, PlatformKind::Linux);
        assert_eq!(platform.name(), "local");
    }

    #[test]
    fn remote_kind_is_none_before_initialize() {
        let config = RemoteConfig::new("example.com", "deploy", AuthMethod::Agent);
        let platform = SshPlatform::new(config).unwrap();
        assert_eq!(remote_kind(&platform), None);
    }
}
