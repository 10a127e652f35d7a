//! CPU metrics via PDH (Performance Data Helper) counters.
//!
//! PDH counters are stateful: a query must be opened once, counters added,
//! and `PdhCollectQueryData` called on every sample -- the first collection
//! primes the counter and always yields 0, which lines up neatly with this
//! core's own first-sample-is-zero contract for [`CpuProvider::usage`].

use crate::{CpuInfo, CpuProvider, Result};
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::sync::Mutex;
use telemetry_metrics::Error;
use windows::Win32::System::Performance::{
    PdhAddCounterW, PdhCollectQueryData, PdhGetFormattedCounterValue, PdhOpenQueryW,
    PDH_FMT_DOUBLE, PDH_HCOUNTER, PDH_HQUERY,
};
use windows::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};
use windows::core::PCWSTR;

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

struct PdhQuery {
    query: PDH_HQUERY,
    total: PDH_HCOUNTER,
    per_core: Vec<PDH_HCOUNTER>,
}

// SAFETY: PDH handles are only ever touched while `state`'s mutex is held.
unsafe impl Send for PdhQuery {}

pub struct PdhCpuProvider {
    state: Mutex<Option<PdhQuery>>,
}

impl PdhCpuProvider {
    pub fn new() -> Self {
        Self { state: Mutex::new(None) }
    }

    fn ensure_query(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.is_some() {
            return Ok(());
        }

        let num_cores = logical_core_count();
        unsafe {
            let mut query = PDH_HQUERY::default();
            PdhOpenQueryW(PCWSTR::null(), 0, &mut query)
                .ok()
                .map_err(|e| Error::io("cpu.usage", std::io::Error::other(e.to_string())))?;

            let mut total = PDH_HCOUNTER::default();
            let total_path = wide(r"\Processor(_Total)\% Processor Time");
            PdhAddCounterW(query, PCWSTR(total_path.as_ptr()), 0, &mut total)
                .ok()
                .map_err(|e| Error::io("cpu.usage", std::io::Error::other(e.to_string())))?;

            let mut per_core = Vec::with_capacity(num_cores);
            for i in 0..num_cores {
                let mut counter = PDH_HCOUNTER::default();
                let path = wide(&format!(r"\Processor({i})\% Processor Time"));
                PdhAddCounterW(query, PCWSTR(path.as_ptr()), 0, &mut counter)
                    .ok()
                    .map_err(|e| Error::io("cpu.usage", std::io::Error::other(e.to_string())))?;
                per_core.push(counter);
            }

            *state = Some(PdhQuery { query, total, per_core });
        }
        Ok(())
    }

    fn collect(&self) -> Result<(f64, Vec<f64>)> {
        self.ensure_query()?;
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let q = state.as_ref().expect("ensure_query just populated this");

        unsafe {
            PdhCollectQueryData(q.query)
                .ok()
                .map_err(|e| Error::io("cpu.usage", std::io::Error::other(e.to_string())))?;

            let total = format_counter(q.total)?;
            let per_core = q.per_core.iter().map(|c| format_counter(*c)).collect::<Result<Vec<_>>>()?;
            Ok((total, per_core))
        }
    }
}

unsafe fn format_counter(counter: PDH_HCOUNTER) -> Result<f64> {
    let mut value = windows::Win32::System::Performance::PDH_FMT_COUNTERVALUE::default();
    let status = unsafe {
        PdhGetFormattedCounterValue(counter, PDH_FMT_DOUBLE, None, &mut value)
    };
    if status.is_err() {
        // A counter that hasn't been sampled twice yet reports an error
        // rather than a value; this is this provider's first-sample zero.
        return Ok(0.0);
    }
    Ok(unsafe { value.Anonymous.doubleValue })
}

fn logical_core_count() -> usize {
    unsafe {
        let mut info = SYSTEM_INFO::default();
        GetSystemInfo(&mut info);
        info.dwNumberOfProcessors.max(1) as usize
    }
}

impl CpuProvider for PdhCpuProvider {
    fn usage(&self) -> Result<Vec<f64>> {
        let (_, per_core) = self.collect()?;
        Ok(per_core.into_iter().map(|v| v.clamp(0.0, 100.0)).collect())
    }

    fn total_usage(&self) -> Result<f64> {
        let (total, _) = self.collect()?;
        Ok(total.clamp(0.0, 100.0))
    }

    fn frequency(&self) -> Result<Vec<u64>> {
        let base_mhz = super::identity::processor_max_clock_mhz().unwrap_or(0);
        Ok(vec![base_mhz; logical_core_count()])
    }

    fn info(&self) -> Result<CpuInfo> {
        let (physical_cores, logical_threads) = super::identity::core_counts();
        Ok(CpuInfo {
            model: String::new(),
            vendor: String::new(),
            physical_cores,
            logical_threads,
            cache_bytes: 0,
        })
    }

    fn load_average(&self) -> Result<(f64, f64, f64)> {
        Err(Error::unsupported("cpu.load_average"))
    }
}
