//! `vm_stat` output parsing (remote Darwin memory provider).

use telemetry_metrics::{Error, Result};

/// Page-class counts from `vm_stat`, still in pages -- the caller multiplies
/// by `page_size` to get bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct VmStatCounts {
    pub page_size: u64,
    pub free: u64,
    pub active: u64,
    pub inactive: u64,
    pub wired: u64,
    pub speculative: u64,
    pub purgeable: u64,
}

/// Parse `vm_stat`'s output, e.g.:
///
/// ```text
/// Mach Virtual Memory Statistics: (page size of 4096 bytes)
/// Pages free:                               12345.
/// Pages active:                             23456.
/// Pages inactive:                            1234.
/// Pages speculative:                          123.
/// Pages wired down:                          4567.
/// Pages purgeable:                             10.
/// ```
///
/// Unknown lines are ignored; fields absent from the output default to 0.
pub fn parse_vm_stat(content: &str) -> Result<VmStatCounts> {
    let mut counts = VmStatCounts::default();

    let header = content
        .lines()
        .next()
        .ok_or_else(|| Error::parse("vm_stat", "empty output"))?;
    counts.page_size = header
        .split("page size of")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(4096);

    for line in content.lines().skip(1) {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().trim_end_matches('.');
        let Ok(pages) = value.parse::<u64>() else {
            continue;
        };
        match label.trim() {
            "Pages free" => counts.free = pages,
            "Pages active" => counts.active = pages,
            "Pages inactive" => counts.inactive = pages,
            "Pages wired down" => counts.wired = pages,
            "Pages speculative" => counts.speculative = pages,
            "Pages purgeable" => counts.purgeable = pages,
            _ => {}
        }
    }

    Ok(counts)
}

/// Parse `sysctl -n vm.swapusage`'s output, e.g.
/// `total = 2048.00M  used = 512.00M  free = 1536.00M  (encrypted)`.
/// Returns `(total_bytes, used_bytes)`.
pub fn parse_swapusage(content: &str) -> Result<(u64, u64)> {
    let total = extract_megabyte_field(content, "total")
        .ok_or_else(|| Error::parse("vm.swapusage", "missing total field"))?;
    let used = extract_megabyte_field(content, "used")
        .ok_or_else(|| Error::parse("vm.swapusage", "missing used field"))?;
    Ok((total, used))
}

fn extract_megabyte_field(content: &str, field: &str) -> Option<u64> {
    let marker = format!("{field} =");
    let rest = content.split(&marker).nth(1)?;
    let token = rest.trim().split_whitespace().next()?;
    let megabytes: f64 = token.trim_end_matches('M').parse().ok()?;
    Some((megabytes * 1024.0 * 1024.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Mach Virtual Memory Statistics: (page size of 4096 bytes)\n\
Pages free:                               12345.\n\
Pages active:                             23456.\n\
Pages inactive:                            1234.\n\
Pages speculative:                          123.\n\
Pages wired down:                          4567.\n\
Pages purgeable:                             10.\n";

    #[test]
    fn parses_page_size_from_the_header() {
        let counts = parse_vm_stat(SAMPLE).unwrap();
        assert_eq!(counts.page_size, 4096);
    }

    #[test]
    fn parses_each_page_class() {
        let counts = parse_vm_stat(SAMPLE).unwrap();
        assert_eq!(counts.free, 12345);
        assert_eq!(counts.active, 23456);
        assert_eq!(counts.inactive, 1234);
        assert_eq!(counts.speculative, 123);
        assert_eq!(counts.wired, 4567);
        assert_eq!(counts.purgeable, 10);
    }

    #[test]
    fn parses_swapusage() {
        let (total, used) = parse_swapusage("total = 2048.00M  used = 512.00M  free = 1536.00M  (encrypted)\n").unwrap();
        assert_eq!(total, 2048 * 1024 * 1024);
        assert_eq!(used, 512 * 1024 * 1024);
    }
}
