//! Pure text-format parsers shared between local `/proc`-reading providers
//! and remote providers that pull the same files over an SSH `cat`.
//!
//! Nothing in this crate touches the filesystem or a socket: every function
//! takes `&str` content and returns a value type or an `Error::Parse`.

pub mod bsd_mount;
pub mod bsd_netstat;
pub mod df;
pub mod diskstats;
pub mod loadavg;
pub mod meminfo;
pub mod mounts;
pub mod net_dev;
pub mod proc_stat;
pub mod shell;
pub mod units;
pub mod vm_stat;

pub use bsd_mount::parse_mount_output;
pub use bsd_netstat::{parse_netstat_ib, parse_netstat_interface_list, NetstatCounters};
pub use df::{parse_df_inodes, parse_df_space, DfInodes, DfSpace};
pub use diskstats::parse_diskstats_line;
pub use loadavg::parse_loadavg;
pub use meminfo::parse_meminfo;
pub use mounts::{parse_mounts, parse_mounts_excluding, unescape_octal};
pub use net_dev::parse_net_dev;
pub use proc_stat::{parse_stat_cpu_line, CpuTicks};
pub use shell::{shell_quote, validate_path};
pub use units::kb_to_bytes;
pub use vm_stat::{parse_swapusage, parse_vm_stat, VmStatCounts};
