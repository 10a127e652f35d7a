//! telemetry-metrics - Abstract telemetry collection traits
//!
//! This crate defines the value types and the six provider interfaces
//! (CPU, memory, network, filesystem, battery, sensors) that platform-specific
//! code implements, plus the `Platform` facade that groups them for one host
//! -- local or reached over SSH.

use std::time::{Duration, SystemTime};
use thiserror::Error;

pub use tokio_util::sync::CancellationToken;

/// Error taxonomy shared by every provider and the SSH transport.
#[derive(Error, Debug)]
pub enum Error {
    /// Interface/device/mount/battery-index does not exist.
    #[error("{operation}: not found: {target}")]
    NotFound {
        /// The operation that failed (e.g. `"network.stats"`).
        operation: &'static str,
        /// The target that was not found (e.g. an interface name).
        target: String,
    },

    /// Unexpected format in `/proc`, command output, or a sysctl value.
    #[error("{operation}: parse error: {message}")]
    Parse {
        /// The operation that failed.
        operation: &'static str,
        /// A description of what failed to parse.
        message: String,
    },

    /// Transient filesystem or socket error.
    #[error("{operation}: I/O error: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A bounded wait was exceeded.
    #[error("{operation}: timed out after {0:?}", .elapsed)]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
        /// How long the operation waited before giving up.
        elapsed: Duration,
    },

    /// The SSH transport is broken (dial failure, reset, closed socket, etc).
    #[error("{operation}: connection error: {message}")]
    Connection {
        /// The operation that failed.
        operation: &'static str,
        /// The underlying transport error text.
        message: String,
    },

    /// The feature is not available on this platform.
    #[error("{operation}: not supported on this platform")]
    Unsupported {
        /// The operation that is not supported.
        operation: &'static str,
    },

    /// The platform's cancellation token fired.
    #[error("{operation}: cancelled")]
    Cancelled {
        /// The operation that was cancelled.
        operation: &'static str,
    },
}

impl Error {
    /// Build a [`Error::NotFound`] for `operation`/`target`.
    pub fn not_found(operation: &'static str, target: impl Into<String>) -> Self {
        Error::NotFound {
            operation,
            target: target.into(),
        }
    }

    /// Build a [`Error::Parse`] for `operation`/`message`.
    pub fn parse(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Parse {
            operation,
            message: message.into(),
        }
    }

    /// Build a [`Error::Unsupported`] for `operation`.
    pub fn unsupported(operation: &'static str) -> Self {
        Error::Unsupported { operation }
    }

    /// Build a [`Error::Connection`] for `operation`/`message`.
    pub fn connection(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Connection {
            operation,
            message: message.into(),
        }
    }

    /// Wrap an I/O error with operation context.
    pub fn io(operation: &'static str, source: std::io::Error) -> Self {
        Error::Io { operation, source }
    }

    /// True if this is a connection-taxonomy error whose text matches one of
    /// the substrings in [`CONNECTION_ERROR_PATTERNS`] (case-insensitive).
    pub fn looks_like_connection_error(text: &str) -> bool {
        CONNECTION_ERROR_PATTERNS
            .iter()
            .any(|pattern| contains_ignore_case(text, pattern))
    }
}

/// Substrings (checked case-insensitively) that classify a transport error as
/// a dead connection worth reconnecting over, per spec section 7.
pub const CONNECTION_ERROR_PATTERNS: &[&str] = &[
    "connection refused",
    "connection reset",
    "broken pipe",
    "timeout",
    "eof",
    "use of closed network connection",
    "no route to host",
    "network is unreachable",
];

/// Case-insensitive substring search, used for connection-error classification.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

/// Result type alias for telemetry operations.
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// CPU
// ============================================================================

/// Static CPU description, cached after the first successful read.
#[derive(Debug, Clone, Default)]
pub struct CpuInfo {
    /// Model name (e.g. `"Intel(R) Core(TM) i7-9750H"`).
    pub model: String,
    /// Vendor string (e.g. `"GenuineIntel"`, `"AppleSilicon"`).
    pub vendor: String,
    /// Number of physical cores.
    pub physical_cores: u32,
    /// Number of logical threads (physical cores x hyperthreading factor).
    pub logical_threads: u32,
    /// Last-level cache size in bytes (0 if unknown).
    pub cache_bytes: u64,
}

/// Trait for CPU metrics collection.
///
/// `usage`/`total_usage` are delta-based: the first call after construction
/// always returns zeros, because there is no previous sample to difference
/// against. Callers that need a meaningful first reading must sample twice,
/// separated by at least 100 ms.
pub trait CpuProvider: Send + Sync {
    /// Per-core usage percentages, in core-index order.
    fn usage(&self) -> Result<Vec<f64>>;
    /// Aggregate usage percentage across all cores.
    fn total_usage(&self) -> Result<f64>;
    /// Per-core clock frequency in MHz, best-effort.
    fn frequency(&self) -> Result<Vec<u64>>;
    /// Static CPU description.
    fn info(&self) -> Result<CpuInfo>;
    /// 1/5/15-minute load averages. `Unsupported` on Windows.
    fn load_average(&self) -> Result<(f64, f64, f64)>;
}

// ============================================================================
// MEMORY
// ============================================================================

/// System memory snapshot. All byte fields are absolute, not rates.
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    /// Total physical memory in bytes.
    pub total_bytes: u64,
    /// Used memory in bytes. Invariant: `0 <= used_bytes <= total_bytes`.
    pub used_bytes: u64,
    /// Free (unused, unclaimed) memory in bytes.
    pub free_bytes: u64,
    /// Memory available for new allocations without swapping.
    pub available_bytes: u64,
    /// Page-cache memory in bytes (0 where the platform doesn't expose it).
    pub cached_bytes: u64,
    /// Kernel buffer memory in bytes (Linux-family only, 0 elsewhere).
    pub buffers_bytes: u64,
    /// `used_bytes / total_bytes * 100`, clamped to `[0, 100]`.
    pub used_percent: f64,
}

/// Swap/page-file snapshot. `total_bytes == 0` implies an all-zero record.
#[derive(Debug, Clone, Default)]
pub struct SwapStats {
    /// Total configured swap in bytes.
    pub total_bytes: u64,
    /// Used swap in bytes.
    pub used_bytes: u64,
    /// Free swap in bytes.
    pub free_bytes: u64,
    /// `used_bytes / total_bytes * 100`, or `0` if `total_bytes == 0`.
    pub used_percent: f64,
}

/// Trait for memory metrics collection.
pub trait MemoryProvider: Send + Sync {
    /// Physical memory snapshot.
    fn stats(&self) -> Result<MemoryStats>;
    /// Swap/page-file snapshot.
    fn swap_stats(&self) -> Result<SwapStats>;
}

// ============================================================================
// NETWORK
// ============================================================================

/// Network interface counters. Fields are absolute, monotonically
/// increasing counters since interface creation or the last counter wrap --
/// not rates. Callers wanting a rate take two samples and difference them.
#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    /// Interface name.
    pub interface: String,
    /// Bytes received.
    pub rx_bytes: u64,
    /// Packets received.
    pub rx_packets: u64,
    /// Receive errors.
    pub rx_errors: u64,
    /// Receive drops.
    pub rx_drops: u64,
    /// Bytes transmitted.
    pub tx_bytes: u64,
    /// Packets transmitted.
    pub tx_packets: u64,
    /// Transmit errors.
    pub tx_errors: u64,
    /// Transmit drops.
    pub tx_drops: u64,
}

/// Trait for network metrics collection.
pub trait NetworkProvider: Send + Sync {
    /// All interface names visible to the OS. macOS excludes loopback;
    /// other platforms retain it.
    fn interfaces(&self) -> Result<Vec<String>>;
    /// Counters for one interface. `NotFound` if `name` doesn't exist.
    fn stats(&self, name: &str) -> Result<NetworkStats>;
    /// Counters for every interface. Interfaces whose individual query
    /// fails are silently dropped rather than failing the whole call.
    fn all_stats(&self) -> Result<Vec<NetworkStats>>;
}

// ============================================================================
// FILESYSTEM
// ============================================================================

/// One mounted filesystem entry (virtual filesystems are pre-filtered out).
#[derive(Debug, Clone, Default)]
pub struct MountInfo {
    /// Device path (e.g. `/dev/sda1`).
    pub device: String,
    /// Mount point (octal `\NNN` escapes already decoded).
    pub mount_point: String,
    /// Filesystem type (e.g. `ext4`, `apfs`, `ntfs`).
    pub fs_type: String,
    /// Mount options, as individual comma-separated tokens.
    pub options: Vec<String>,
}

/// Space/inode usage for one mount point.
#[derive(Debug, Clone, Default)]
pub struct FilesystemStats {
    /// Total space in bytes.
    pub total_bytes: u64,
    /// Used space in bytes. Invariant: `used_bytes <= total_bytes`.
    pub used_bytes: u64,
    /// Free space in bytes. Invariant: `free_bytes <= total_bytes`.
    pub free_bytes: u64,
    /// `used_bytes / total_bytes * 100`, or `0` if `total_bytes == 0`.
    pub used_percent: f64,
    /// Total inodes (0 on filesystems without an inode concept).
    pub inodes_total: u64,
    /// Used inodes.
    pub inodes_used: u64,
    /// Free inodes.
    pub inodes_free: u64,
}

/// Cumulative block-device I/O counters. Absolute, not rates.
#[derive(Debug, Clone, Default)]
pub struct DiskIoStats {
    /// Device name (e.g. `sda`, `disk0`).
    pub device: String,
    /// Bytes read since boot.
    pub bytes_read: u64,
    /// Bytes written since boot.
    pub bytes_written: u64,
    /// Completed read operations.
    pub read_ops: u64,
    /// Completed write operations.
    pub write_ops: u64,
    /// Cumulative time spent servicing reads.
    pub read_busy_time: Duration,
    /// Cumulative time spent servicing writes.
    ///
    /// On macOS, where `iostat -d -I` does not split reads from writes, this
    /// is populated from the same 50/50 split as `read_busy_time` -- see
    /// the `disk_io` doc comment on the Darwin filesystem provider.
    pub write_busy_time: Duration,
}

/// Trait for filesystem/disk metrics collection.
pub trait FilesystemProvider: Send + Sync {
    /// Non-virtual mounted filesystems.
    fn mounts(&self) -> Result<Vec<MountInfo>>;
    /// Space/inode usage for one mount point. `NotFound` if absent.
    fn stats(&self, mount_point: &str) -> Result<FilesystemStats>;
    /// Cumulative I/O counters for one block device. `NotFound` if absent.
    fn disk_io(&self, device: &str) -> Result<DiskIoStats>;
}

// ============================================================================
// BATTERY
// ============================================================================

/// One battery's snapshot.
#[derive(Debug, Clone, Default)]
pub struct BatteryStats {
    /// Charge percent, `0..=100`.
    pub percent: f64,
    /// Time to empty (discharging) or to full (charging).
    pub remaining: Duration,
    /// True if currently charging.
    pub charging: bool,
    /// Design (as-new) capacity in µWh.
    pub design_capacity_uwh: u64,
    /// Full-charge capacity in µWh.
    pub full_capacity_uwh: u64,
    /// Current charge in µWh.
    pub current_charge_uwh: u64,
    /// Current energy draw/input in µW (sign depends on charge direction).
    pub current_energy_uw: i64,
    /// Pack voltage in volts.
    pub voltage: f64,
}

/// Trait for battery metrics collection.
pub trait BatteryProvider: Send + Sync {
    /// Number of batteries present (0 on AC-only desktops).
    fn count(&self) -> Result<u32>;
    /// Snapshot for battery `index`. `NotFound` if out of range.
    fn stats(&self, index: u32) -> Result<BatteryStats>;
}

// ============================================================================
// SENSORS
// ============================================================================

/// One temperature or fan reading.
#[derive(Debug, Clone, Default)]
pub struct SensorReading {
    /// Owning device name (e.g. `"coretemp"`, `"BAT0"`).
    pub device: String,
    /// Sensor label; falls back to the raw sensor key (`"temp1"`, `"fan1"`)
    /// when the platform exposes no human label.
    pub label: String,
    /// The reading's value, in `unit`.
    pub value: f64,
    /// Unit string: `"°C"` for temperatures, `"RPM"` for fans.
    pub unit: String,
    /// Critical threshold in the same unit, or `0` if unknown.
    pub critical: f64,
}

/// Trait for thermal/fan sensor collection.
pub trait SensorProvider: Send + Sync {
    /// All temperature readings (hwmon, thermal zones, battery temp).
    fn temperatures(&self) -> Result<Vec<SensorReading>>;
    /// All fan-speed readings. Empty (not an error) when no fans are exposed.
    fn fans(&self) -> Result<Vec<SensorReading>>;
}

// ============================================================================
// SSH CONNECTION STATE
// ============================================================================

/// SSH connection lifecycle state. See `Platform` docs on the remote
/// transport's state machine for the legal transition set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConnectionState {
    /// No transport established; the manager is idle or has given up.
    #[default]
    Disconnected = 0,
    /// A dial attempt is in flight.
    Connecting = 1,
    /// The transport is up and passing keepalives.
    Connected = 2,
    /// The transport dropped; the reconnect loop is redialing with backoff.
    Reconnecting = 3,
}

/// SSH transport statistics, exposed alongside the remote `Platform`.
#[derive(Debug, Clone, Default)]
pub struct ConnectionStats {
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// When the current connection was established, if connected.
    pub connected_since: Option<SystemTime>,
    /// Reconnect attempts made in the current reconnect episode.
    pub reconnect_attempts: u64,
    /// Total reconnects completed over the connection's lifetime.
    pub total_reconnects: u64,
    /// SSH sessions created (every command creates a fresh one; see
    /// the transport's session-reuse design note).
    pub sessions_created: u64,
    /// SSH sessions reused from the pool (currently always 0; reserved).
    pub sessions_reused: u64,
    /// Keepalive probes sent.
    pub keepalives_sent: u64,
    /// Keepalive probes that failed or timed out.
    pub keepalives_failed: u64,
    /// The most recent error's text, if any.
    pub last_error: Option<String>,
    /// When `last_error` occurred.
    pub last_error_at: Option<SystemTime>,
}

// ============================================================================
// PLATFORM FACADE
// ============================================================================

/// A grouping of the six providers for one host, local or remote.
///
/// `initialize` must be called exactly once before any provider getter;
/// calling it twice is undefined. Getters are safe for concurrent use and
/// stable between `initialize` and `close`. `close` is idempotent.
pub trait Platform: Send + Sync {
    /// A human-readable identifier for this platform instance (hostname or
    /// `"local"`).
    fn name(&self) -> &str;

    /// Bring the platform up. Must be called exactly once before any
    /// provider getter.
    fn initialize(&self, cancellation: CancellationToken) -> Result<()>;

    /// Release all resources. Idempotent; safe to call concurrently.
    /// After `close` returns, provider calls return `Unsupported`.
    fn close(&self) -> Result<()>;

    /// CPU provider.
    fn cpu(&self) -> &dyn CpuProvider;
    /// Memory provider.
    fn memory(&self) -> &dyn MemoryProvider;
    /// Network provider.
    fn network(&self) -> &dyn NetworkProvider;
    /// Filesystem provider.
    fn filesystem(&self) -> &dyn FilesystemProvider;
    /// Battery provider, or `None` if this platform has no battery capability
    /// (e.g. a desktop tower, or a remote platform that doesn't offer one).
    fn battery(&self) -> Option<&dyn BatteryProvider>;
    /// Sensor provider, or `None` if this platform exposes no sensors.
    fn sensors(&self) -> Option<&dyn SensorProvider>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_patterns_match_case_insensitively() {
        assert!(Error::looks_like_connection_error(
            "Connection Refused here"
        ));
        assert!(Error::looks_like_connection_error("Broken PIPE on write"));
        assert!(!Error::looks_like_connection_error("permission denied"));
    }

    #[test]
    fn contains_ignore_case_matches_regardless_of_case() {
        assert!(contains_ignore_case(
            "Connection Refused here",
            "connection refused"
        ));
        assert!(!contains_ignore_case("hello world", "goodbye"));
    }

    #[test]
    fn swap_stats_default_is_all_zero() {
        let swap = SwapStats::default();
        assert_eq!(swap.total_bytes, 0);
        assert_eq!(swap.used_bytes, 0);
        assert_eq!(swap.used_percent, 0.0);
    }
}
