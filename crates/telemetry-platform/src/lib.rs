//! telemetry-platform - Local, per-OS telemetry providers
//!
//! This crate provides system metrics collection for each supported platform:
//! - Linux: via `/proc` and `/sys`
//! - macOS (Darwin): via Mach host APIs, sysctl, and `iostat`
//! - Windows: via PDH performance counters and the Win32 API
//! - Android: Linux-shaped, with thermal_zone/charge_counter sysfs variants
//!
//! Each platform module exports a concrete `*Platform` struct implementing
//! [`telemetry_metrics::Platform`]. `telemetry-factory` is responsible for
//! picking the right one for the running host.

pub use telemetry_metrics::{
    BatteryProvider, BatteryStats, CancellationToken, ConnectionState, ConnectionStats, CpuInfo,
    CpuProvider, DiskIoStats, Error, FilesystemProvider, FilesystemStats, MemoryProvider,
    MemoryStats, MountInfo, NetworkProvider, NetworkStats, Platform, Result, SensorProvider,
    SensorReading, SwapStats,
};

pub mod delta;

mod closed;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "macos")]
pub mod darwin;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "windows",
    target_os = "android"
)))]
pub mod stub;

#[cfg(target_os = "linux")]
pub use linux::LinuxPlatform as LocalPlatform;

#[cfg(target_os = "macos")]
pub use darwin::DarwinPlatform as LocalPlatform;

#[cfg(target_os = "windows")]
pub use windows::WindowsPlatform as LocalPlatform;

#[cfg(target_os = "android")]
pub use android::AndroidPlatform as LocalPlatform;

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "windows",
    target_os = "android"
)))]
pub use stub::StubPlatform as LocalPlatform;

/// Construct the local platform implementation for the host this binary is
/// running on.
pub fn new_local_platform() -> LocalPlatform {
    LocalPlatform::new()
}
