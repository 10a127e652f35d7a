//! Raw `sysctl`/Mach FFI wrappers for the Darwin providers.
//!
//! Every function here returns plain data (no `telemetry_metrics` value
//! types): the `darwin::{cpu,memory,network,filesystem}` modules translate
//! these into the shared provider types and apply the delta/clamping rules
//! the spec describes.

use std::ffi::CString;
use std::mem;
use std::ptr;
use telemetry_metrics::{Error, Result};

// ============================================================================
// CPU
// ============================================================================

/// Cumulative (user, system, idle) tick counts for one core.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreTicks {
    pub user: u64,
    pub system: u64,
    pub idle: u64,
}

impl CoreTicks {
    pub fn total(&self) -> u64 {
        self.user + self.system + self.idle
    }
    pub fn busy(&self) -> u64 {
        self.user + self.system
    }
}

/// Per-core tick counters via `host_processor_info(PROCESSOR_CPU_LOAD_INFO)`.
pub fn cpu_times() -> Result<Vec<CoreTicks>> {
    unsafe {
        let mut count: libc::c_uint = 0;
        let mut info: *mut libc::c_int = ptr::null_mut();
        let mut info_count: libc::c_uint = 0;

        let host = libc::mach_host_self();
        let result =
            host_processor_info(host, PROCESSOR_CPU_LOAD_INFO, &mut count, &mut info, &mut info_count);

        if result != 0 || info.is_null() {
            return Err(Error::io(
                "cpu.usage",
                std::io::Error::other("host_processor_info failed"),
            ));
        }

        let mut cores = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let base = i * CPU_STATE_MAX;
            cores.push(CoreTicks {
                user: (*info.add(base + CPU_STATE_USER as usize)) as u64,
                system: (*info.add(base + CPU_STATE_SYSTEM as usize)) as u64,
                idle: (*info.add(base + CPU_STATE_IDLE as usize)) as u64,
            });
        }

        libc::vm_deallocate(
            libc::mach_task_self(),
            info as libc::vm_address_t,
            (info_count as usize) * mem::size_of::<libc::c_int>(),
        );

        Ok(cores)
    }
}

/// Static CPU description from `hw.*`/`machdep.cpu.*` sysctl MIBs.
pub fn cpu_info() -> Result<(String, String, u32, u32, u64)> {
    let brand = sysctl_string("machdep.cpu.brand_string").unwrap_or_default();
    let physical_cores = sysctl_u64("hw.physicalcpu").unwrap_or(0) as u32;
    let logical_threads = sysctl_u64("hw.logicalcpu").unwrap_or(0) as u32;
    let cache_bytes = sysctl_u64("hw.l3cachesize")
        .filter(|v| *v > 0)
        .or_else(|| sysctl_u64("hw.l2cachesize"))
        .unwrap_or(0);
    Ok((brand, "Apple".to_string(), physical_cores, logical_threads, cache_bytes))
}

/// Per-core and base clock frequency, in MHz (`hw.cpufrequency`).
pub fn cpu_frequency_mhz() -> u64 {
    sysctl_u64("hw.cpufrequency").unwrap_or(0) / 1_000_000
}

pub fn load_average() -> Result<(f64, f64, f64)> {
    unsafe {
        let mut avg: [libc::c_double; 3] = [0.0; 3];
        if libc::getloadavg(avg.as_mut_ptr(), 3) < 0 {
            return Err(Error::io("cpu.load_average", std::io::Error::last_os_error()));
        }
        Ok((avg[0], avg[1], avg[2]))
    }
}

// ============================================================================
// MEMORY
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct VmCounts {
    pub free: u64,
    pub active: u64,
    pub inactive: u64,
    pub wired: u64,
    pub speculative: u64,
    pub purgeable: u64,
}

pub fn memsize() -> u64 {
    sysctl_u64("hw.memsize").unwrap_or(0)
}

pub fn pagesize() -> u64 {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE).max(0) as u64 }
}

/// VM page-class counts via `host_statistics64(HOST_VM_INFO64)`, in pages.
pub fn vm_counts() -> Result<VmCounts> {
    unsafe {
        let host = libc::mach_host_self();
        let mut stats: VmStatistics64 = mem::zeroed();
        let mut count = (mem::size_of::<VmStatistics64>() / mem::size_of::<libc::c_int>()) as u32;

        let result =
            host_statistics64(host, HOST_VM_INFO64, &mut stats as *mut _ as *mut libc::c_int, &mut count);

        if result != 0 {
            return Err(Error::io(
                "memory.stats",
                std::io::Error::other("host_statistics64 failed"),
            ));
        }

        Ok(VmCounts {
            free: stats.free_count,
            active: stats.active_count,
            inactive: stats.inactive_count,
            wired: stats.wire_count,
            speculative: stats.speculative_count,
            purgeable: stats.purgeable_count,
        })
    }
}

pub fn swap_usage() -> Result<(u64, u64)> {
    let mut usage: XswUsage = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<XswUsage>();
    let name = CString::new("vm.swapusage").unwrap();
    let rc = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            &mut usage as *mut _ as *mut libc::c_void,
            &mut len,
            ptr::null_mut(),
            0,
        )
    };
    if rc != 0 {
        return Ok((0, 0));
    }
    Ok((usage.xsu_total, usage.xsu_used))
}

// ============================================================================
// FILESYSTEM
// ============================================================================

pub struct MountEntry {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
}

/// Real mounts via `getmntinfo(3)`, with `devfs`/`map`/hidden-volume
/// pseudo-entries filtered the way Finder's "Macintosh HD" view does.
pub fn mounts() -> Result<Vec<MountEntry>> {
    unsafe {
        let mut fs_list: *mut libc::statfs = ptr::null_mut();
        let count = libc::getmntinfo(&mut fs_list, libc::MNT_NOWAIT);
        if count <= 0 || fs_list.is_null() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for i in 0..count {
            let fs = &*fs_list.add(i as usize);
            let device = cstr_to_string(fs.f_mntfromname.as_ptr());
            let mount_point = cstr_to_string(fs.f_mntonname.as_ptr());
            let fs_type = cstr_to_string(fs.f_fstypename.as_ptr());

            if device.starts_with("devfs")
                || device.starts_with("map ")
                || mount_point.starts_with("/System/Volumes/")
            {
                continue;
            }
            out.push(MountEntry { device, mount_point, fs_type });
        }
        Ok(out)
    }
}

pub struct StatfsResult {
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub available_bytes: u64,
    pub inodes_total: u64,
    pub inodes_free: u64,
}

pub fn statfs(path: &str) -> Result<StatfsResult> {
    let c_path = CString::new(path).map_err(|e| Error::parse("filesystem.stats", e.to_string()))?;
    let mut stat: libc::statfs = unsafe { mem::zeroed() };
    let rc = unsafe { libc::statfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(Error::not_found("filesystem.stats", path));
    }

    let block_size = stat.f_bsize as u64;
    Ok(StatfsResult {
        total_bytes: (stat.f_blocks as u64).saturating_mul(block_size),
        free_bytes: (stat.f_bfree as u64).saturating_mul(block_size),
        available_bytes: (stat.f_bavail as u64).saturating_mul(block_size),
        inodes_total: stat.f_files as u64,
        inodes_free: stat.f_ffree as u64,
    })
}

// ============================================================================
// NETWORK
// ============================================================================

pub struct InterfaceInfo {
    pub name: String,
    pub is_loopback: bool,
}

pub fn interfaces() -> Result<Vec<InterfaceInfo>> {
    unsafe {
        let mut addrs: *mut libc::ifaddrs = ptr::null_mut();
        if libc::getifaddrs(&mut addrs) != 0 {
            return Err(Error::io("network.interfaces", std::io::Error::last_os_error()));
        }

        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        let mut cursor = addrs;
        while !cursor.is_null() {
            let ifa = &*cursor;
            let name = cstr_to_string(ifa.ifa_name);
            if seen.insert(name.clone()) {
                out.push(InterfaceInfo {
                    is_loopback: (ifa.ifa_flags as i32 & libc::IFF_LOOPBACK) != 0,
                    name,
                });
            }
            cursor = ifa.ifa_next;
        }
        libc::freeifaddrs(addrs);
        Ok(out)
    }
}

pub struct InterfaceStats {
    pub name: String,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub rx_errors: u64,
    pub rx_drops: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
}

/// Per-interface counters via `sysctl(CTL_NET, PF_ROUTE, NET_RT_IFLIST2)`,
/// the same MIB the spec names as `net.link.generic.ifdata`.
pub fn interface_stats() -> Result<Vec<InterfaceStats>> {
    unsafe {
        let mut mib = [libc::CTL_NET, libc::PF_ROUTE, 0, 0, NET_RT_IFLIST2, 0];
        let mut len: usize = 0;
        if libc::sysctl(mib.as_mut_ptr(), 6, ptr::null_mut(), &mut len, ptr::null_mut(), 0) != 0 {
            return Err(Error::io("network.all_stats", std::io::Error::last_os_error()));
        }

        let mut buf: Vec<u8> = vec![0; len];
        if libc::sysctl(
            mib.as_mut_ptr(),
            6,
            buf.as_mut_ptr() as *mut libc::c_void,
            &mut len,
            ptr::null_mut(),
            0,
        ) != 0
        {
            return Err(Error::io("network.all_stats", std::io::Error::last_os_error()));
        }

        let mut out = Vec::new();
        let mut offset = 0;
        while offset + mem::size_of::<IfMsgHdr>() <= len {
            let header = buf.as_ptr().add(offset) as *const IfMsgHdr;
            let msg_len = (*header).ifm_msglen as usize;
            if msg_len == 0 {
                break;
            }

            if (*header).ifm_type as i32 == RTM_IFINFO2 && offset + mem::size_of::<IfMsgHdr2>() <= len {
                let header2 = buf.as_ptr().add(offset) as *const IfMsgHdr2;
                let data = &(*header2).ifm_data;
                let mut name_buf = [0i8; libc::IF_NAMESIZE];
                if !libc::if_indextoname((*header2).ifm_index as u32, name_buf.as_mut_ptr()).is_null() {
                    out.push(InterfaceStats {
                        name: cstr_to_string(name_buf.as_ptr()),
                        rx_bytes: data.ifi_ibytes,
                        rx_packets: data.ifi_ipackets,
                        rx_errors: data.ifi_ierrors,
                        rx_drops: data.ifi_iqdrops,
                        tx_bytes: data.ifi_obytes,
                        tx_packets: data.ifi_opackets,
                        tx_errors: data.ifi_oerrors,
                    });
                }
            }
            offset += msg_len;
        }
        Ok(out)
    }
}

fn sysctl_string(name: &str) -> Option<String> {
    let cname = CString::new(name).ok()?;
    let mut len: usize = 0;
    unsafe {
        if libc::sysctlbyname(cname.as_ptr(), ptr::null_mut(), &mut len, ptr::null_mut(), 0) != 0 {
            return None;
        }
        let mut buf = vec![0u8; len];
        if libc::sysctlbyname(
            cname.as_ptr(),
            buf.as_mut_ptr() as *mut libc::c_void,
            &mut len,
            ptr::null_mut(),
            0,
        ) != 0
        {
            return None;
        }
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Some(String::from_utf8_lossy(&buf[..end]).into_owned())
    }
}

fn sysctl_u64(name: &str) -> Option<u64> {
    let cname = CString::new(name).ok()?;
    let mut value: u64 = 0;
    let mut len = mem::size_of::<u64>();
    let rc = unsafe {
        libc::sysctlbyname(
            cname.as_ptr(),
            &mut value as *mut _ as *mut libc::c_void,
            &mut len,
            ptr::null_mut(),
            0,
        )
    };
    if rc != 0 {
        return None;
    }
    Some(value)
}

unsafe fn cstr_to_string(ptr: *const libc::c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

// ============================================================================
// Mach/BSD raw types not exposed by `libc`
// ============================================================================

const PROCESSOR_CPU_LOAD_INFO: libc::c_int = 2;
const CPU_STATE_USER: libc::c_int = 0;
const CPU_STATE_SYSTEM: libc::c_int = 1;
const CPU_STATE_IDLE: libc::c_int = 2;
const CPU_STATE_MAX: usize = 4;
const HOST_VM_INFO64: libc::c_int = 4;
const NET_RT_IFLIST2: libc::c_int = 0x4;
const RTM_IFINFO2: i32 = 0x12;

#[repr(C)]
#[derive(Default)]
struct VmStatistics64 {
    free_count: u64,
    active_count: u64,
    inactive_count: u64,
    wire_count: u64,
    zero_fill_count: u64,
    reactivations: u64,
    pageins: u64,
    pageouts: u64,
    faults: u64,
    cow_faults: u64,
    lookups: u64,
    hits: u64,
    purges: u64,
    purgeable_count: u64,
    speculative_count: u64,
    decompressions: u64,
    compressions: u64,
    swapins: u64,
    swapouts: u64,
    compressor_page_count: u64,
    throttled_count: u64,
    external_page_count: u64,
    internal_page_count: u64,
    total_uncompressed_pages_in_compressor: u64,
}

#[repr(C)]
struct XswUsage {
    xsu_total: u64,
    xsu_avail: u64,
    xsu_used: u64,
    xsu_pagesize: u32,
    xsu_encrypted: bool,
}

#[repr(C)]
struct IfData64 {
    ifi_type: u8,
    ifi_typelen: u8,
    ifi_physical: u8,
    ifi_addrlen: u8,
    ifi_hdrlen: u8,
    ifi_recvquota: u8,
    ifi_xmitquota: u8,
    ifi_unused1: u8,
    ifi_mtu: u32,
    ifi_metric: u32,
    ifi_baudrate: u64,
    ifi_ipackets: u64,
    ifi_ierrors: u64,
    ifi_opackets: u64,
    ifi_oerrors: u64,
    ifi_collisions: u64,
    ifi_ibytes: u64,
    ifi_obytes: u64,
    ifi_imcasts: u64,
    ifi_omcasts: u64,
    ifi_iqdrops: u64,
    ifi_noproto: u64,
    ifi_recvtiming: u32,
    ifi_xmittiming: u32,
    ifi_lastchange: libc::timeval32,
}

#[repr(C)]
struct IfMsgHdr {
    ifm_msglen: u16,
    ifm_version: u8,
    ifm_type: u8,
    ifm_addrs: i32,
    ifm_flags: i32,
    ifm_index: u16,
    ifm_data: IfData64,
}

#[repr(C)]
struct IfMsgHdr2 {
    ifm_msglen: u16,
    ifm_version: u8,
    ifm_type: u8,
    ifm_addrs: i32,
    ifm_flags: i32,
    ifm_index: u16,
    ifm_snd_len: i32,
    ifm_snd_maxlen: i32,
    ifm_snd_drops: i32,
    ifm_timer: i32,
    ifm_data: IfData64,
}

unsafe extern "C" {
    fn host_processor_info(
        host: libc::mach_port_t,
        flavor: libc::c_int,
        out_processor_count: *mut libc::c_uint,
        out_processor_info: *mut *mut libc::c_int,
        out_processor_info_count: *mut libc::c_uint,
    ) -> libc::c_int;

    fn host_statistics64(
        host: libc::mach_port_t,
        flavor: libc::c_int,
        host_info_out: *mut libc::c_int,
        host_info_out_count: *mut u32,
    ) -> libc::c_int;
}
