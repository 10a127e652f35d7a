//! Parser for `/proc/stat` cpu/cpuN lines.

use telemetry_metrics::{Error, Result};

/// Raw tick counters for one `cpu` or `cpuN` line of `/proc/stat`.
///
/// All fields are in USER_HZ ticks, cumulative since boot. Fields added in
/// newer kernels (`guest`, `guest_nice`) default to 0 on kernels that don't
/// report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    /// Index: -1 for the aggregate `cpu` line, otherwise the core number.
    pub index: i32,
    /// Time spent in user mode.
    pub user: u64,
    /// Time spent in user mode with low priority (nice).
    pub nice: u64,
    /// Time spent in system mode.
    pub system: u64,
    /// Time spent idle.
    pub idle: u64,
    /// Time waiting for I/O to complete.
    pub iowait: u64,
    /// Time servicing interrupts.
    pub irq: u64,
    /// Time servicing softirqs.
    pub softirq: u64,
    /// Time stolen by other operating systems running in a virtualised env.
    pub steal: u64,
    /// Time spent running a virtual CPU for guest operating systems.
    pub guest: u64,
    /// Time spent running a niced guest.
    pub guest_nice: u64,
}

impl CpuTicks {
    /// Sum of the eight documented accounting fields (user, nice, system,
    /// idle, iowait, irq, softirq, steal): the denominator for a percentage
    /// computation. `guest`/`guest_nice` are excluded -- they're already
    /// counted inside `user`/`nice` by the kernel, so folding them in again
    /// here would double-count and inflate the denominator.
    pub fn total(&self) -> u64 {
        self.user + self.nice + self.system + self.idle + self.iowait + self.irq + self.softirq + self.steal
    }

    /// Ticks not spent idle or waiting on I/O: `total() - idle - iowait`.
    pub fn busy(&self) -> u64 {
        self.total().saturating_sub(self.idle).saturating_sub(self.iowait)
    }
}

/// Parse one `cpu`/`cpuN` line from `/proc/stat`, e.g.
/// `"cpu0 123 0 456 7890 12 0 3 0 0 0"`.
///
/// Returns `Error::Parse` if the line doesn't start with `cpu` or has fewer
/// than the four mandatory fields (user/nice/system/idle).
pub fn parse_stat_cpu_line(line: &str) -> Result<CpuTicks> {
    let mut fields = line.split_whitespace();
    let label = fields
        .next()
        .ok_or_else(|| Error::parse("proc_stat", "empty line"))?;

    if !label.starts_with("cpu") {
        return Err(Error::parse("proc_stat", format!("not a cpu line: {label}")));
    }

    let index = if label == "cpu" {
        -1
    } else {
        label[3..]
            .parse::<i32>()
            .map_err(|e| Error::parse("proc_stat", format!("bad cpu index {label}: {e}")))?
    };

    let mut values = [0u64; 10];
    let mut n = 0;
    for (i, slot) in values.iter_mut().enumerate() {
        match fields.next() {
            Some(raw) => {
                *slot = raw
                    .parse::<u64>()
                    .map_err(|e| Error::parse("proc_stat", format!("bad tick value {raw}: {e}")))?;
                n = i + 1;
            }
            None => break,
        }
    }
    if n < 4 {
        return Err(Error::parse(
            "proc_stat",
            format!("line has only {n} tick fields, need at least 4"),
        ));
    }

    Ok(CpuTicks {
        index,
        user: values[0],
        nice: values[1],
        system: values[2],
        idle: values[3],
        iowait: values[4],
        irq: values[5],
        softirq: values[6],
        steal: values[7],
        guest: values[8],
        guest_nice: values[9],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aggregate_cpu_line() {
        let ticks = parse_stat_cpu_line("cpu  10132153 290696 3084719 46828483 16683 0 25195 0 175628 0").unwrap();
        assert_eq!(ticks.index, -1);
        assert_eq!(ticks.user, 10132153);
        assert_eq!(ticks.idle, 46828483);
        assert_eq!(ticks.guest, 175628);
    }

    #[test]
    fn parses_indexed_core_line() {
        let ticks = parse_stat_cpu_line("cpu3 100 0 50 900 0 0 0 0 0 0").unwrap();
        assert_eq!(ticks.index, 3);
        assert_eq!(ticks.total(), 1050);
        assert_eq!(ticks.busy(), 150);
    }

    #[test]
    fn rejects_non_cpu_line() {
        assert!(parse_stat_cpu_line("intr 12345 0 0").is_err());
    }

    #[test]
    fn rejects_short_line() {
        assert!(parse_stat_cpu_line("cpu 1 2").is_err());
    }

    #[test]
    fn total_and_busy_exclude_guest_fields() {
        let ticks = parse_stat_cpu_line("cpu0 100 0 50 900 0 0 0 0 500 250").unwrap();
        assert_eq!(ticks.guest, 500);
        assert_eq!(ticks.guest_nice, 250);
        assert_eq!(ticks.total(), 1050);
        assert_eq!(ticks.busy(), 150);
    }

    #[test]
    fn tolerates_missing_trailing_fields() {
        // Older kernels omit guest/guest_nice.
        let ticks = parse_stat_cpu_line("cpu0 1 2 3 4 5 6 7 8").unwrap();
        assert_eq!(ticks.guest, 0);
        assert_eq!(ticks.guest_nice, 0);
    }
}
