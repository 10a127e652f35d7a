//! Parser for `/proc/meminfo`.

use crate::units::kb_to_bytes;
use telemetry_metrics::{Error, MemoryStats, Result, SwapStats};

/// Parse `/proc/meminfo` content into `(MemoryStats, SwapStats)`.
///
/// `MemTotal`/`MemFree` are mandatory; every other key defaults to 0 when
/// absent, which is what happens on kernels too old to report `MemAvailable`.
/// `used_bytes` is derived as `total - free - buffers - cached`, matching
/// what `free(1)` reports, and is clamped to 0 to guard against a kernel that
/// reports `buffers + cached > total - free` transiently.
pub fn parse_meminfo(content: &str) -> Result<(MemoryStats, SwapStats)> {
    let mut values: std::collections::HashMap<&str, u64> = std::collections::HashMap::new();

    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let rest = rest.trim();
        let kb_str = rest.split_whitespace().next().unwrap_or("0");
        let kb = kb_str
            .parse::<u64>()
            .map_err(|e| Error::parse("meminfo", format!("bad value for {key}: {e}")))?;
        values.insert(key.trim(), kb);
    }

    let total_kb = *values
        .get("MemTotal")
        .ok_or_else(|| Error::parse("meminfo", "missing MemTotal"))?;
    let free_kb = *values
        .get("MemFree")
        .ok_or_else(|| Error::parse("meminfo", "missing MemFree"))?;
    let buffers_kb = values.get("Buffers").copied().unwrap_or(0);
    let cached_kb = values.get("Cached").copied().unwrap_or(0);
    let available_kb = values.get("MemAvailable").copied().unwrap_or(free_kb);

    let total_bytes = kb_to_bytes(total_kb)?;
    let free_bytes = kb_to_bytes(free_kb)?;
    let buffers_bytes = kb_to_bytes(buffers_kb)?;
    let cached_bytes = kb_to_bytes(cached_kb)?;
    let available_bytes = kb_to_bytes(available_kb)?;

    let used_bytes = total_bytes
        .saturating_sub(free_bytes)
        .saturating_sub(buffers_bytes)
        .saturating_sub(cached_bytes);
    let used_percent = if total_bytes == 0 {
        0.0
    } else {
        (used_bytes as f64 / total_bytes as f64) * 100.0
    };

    let memory = MemoryStats {
        total_bytes,
        used_bytes,
        free_bytes,
        available_bytes,
        cached_bytes,
        buffers_bytes,
        used_percent,
    };

    let swap_total_kb = values.get("SwapTotal").copied().unwrap_or(0);
    let swap_free_kb = values.get("SwapFree").copied().unwrap_or(0);
    let swap_total_bytes = kb_to_bytes(swap_total_kb)?;
    let swap_free_bytes = kb_to_bytes(swap_free_kb)?;
    let swap_used_bytes = swap_total_bytes.saturating_sub(swap_free_bytes);
    let swap_used_percent = if swap_total_bytes == 0 {
        0.0
    } else {
        (swap_used_bytes as f64 / swap_total_bytes as f64) * 100.0
    };

    let swap = SwapStats {
        total_bytes: swap_total_bytes,
        used_bytes: swap_used_bytes,
        free_bytes: swap_free_bytes,
        used_percent: swap_used_percent,
    };

    Ok((memory, swap))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   10240000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapTotal:       2097152 kB
SwapFree:        1048576 kB
";

    #[test]
    fn parses_the_documented_scenario() {
        let (mem, swap) = parse_meminfo(SAMPLE).unwrap();
        assert_eq!(mem.total_bytes, 16_777_216_000);
        assert_eq!(mem.free_bytes, 8_388_608_000);
        assert_eq!(mem.buffers_bytes, 524_288_000);
        assert_eq!(mem.cached_bytes, 2_097_152_000);
        assert_eq!(mem.used_bytes, 5_767_168_000);
        assert!((mem.used_percent - 34.375).abs() < 0.01);

        assert_eq!(swap.total_bytes, 2_147_483_648);
        assert_eq!(swap.used_bytes, 1_073_741_824);
        assert!((swap.used_percent - 50.0).abs() < 0.01);
    }

    #[test]
    fn missing_mem_available_falls_back_to_mem_free() {
        let content = "MemTotal: 1000 kB\nMemFree: 400 kB\n";
        let (mem, _) = parse_meminfo(content).unwrap();
        assert_eq!(mem.available_bytes, kb_to_bytes(400).unwrap());
    }

    #[test]
    fn zero_swap_total_yields_zero_percent_not_nan() {
        let content = "MemTotal: 1000 kB\nMemFree: 400 kB\n";
        let (_, swap) = parse_meminfo(content).unwrap();
        assert_eq!(swap.used_percent, 0.0);
    }

    #[test]
    fn missing_mem_total_is_an_error() {
        assert!(parse_meminfo("MemFree: 100 kB\n").is_err());
    }
}
