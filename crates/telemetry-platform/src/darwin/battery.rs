//! Battery metrics via `pmset -g batt`.
//!
//! `pmset` is the only portable source for battery state on macOS without
//! linking IOKit; it reports percent, charge direction, and a coarse
//! remaining-time estimate but none of the capacity/voltage fields the
//! value record carries, so those stay zero here.

use crate::{BatteryProvider, BatteryStats, Result};
use std::process::Command;
use std::time::Duration;
use telemetry_metrics::Error;

pub struct DarwinBatteryProvider;

struct PmsetBattery {
    percent: f64,
    charging: bool,
    remaining: Duration,
}

fn run_pmset() -> Result<String> {
    let output = Command::new("pmset")
        .args(["-g", "batt"])
        .output()
        .map_err(|e| Error::io("battery.count", e))?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse a `pmset -g batt` battery line, e.g.
/// `"-InternalBattery-0 (id=...)\t85%; charging; 2:30 remaining present: true"`.
fn parse_battery_line(line: &str) -> Option<PmsetBattery> {
    let after_tab = line.split('\t').nth(1)?;
    let mut parts = after_tab.split(';').map(str::trim);

    let percent: f64 = parts.next()?.trim_end_matches('%').parse().ok()?;
    let status = parts.next().unwrap_or("").to_string();
    let charging = status.eq_ignore_ascii_case("charging") || status.eq_ignore_ascii_case("ac attached");

    let remaining_field = parts.next().unwrap_or("").trim();
    let remaining = if let Some((h, m)) = remaining_field.split_once(':') {
        match (h.parse::<u64>(), m.parse::<u64>()) {
            (Ok(h), Ok(m)) => Duration::from_secs(h * 3600 + m * 60),
            _ => Duration::ZERO,
        }
    } else {
        Duration::ZERO
    };

    Some(PmsetBattery { percent, charging, remaining })
}

fn find_battery_line(text: &str) -> Option<&str> {
    text.lines().find(|line| line.contains("InternalBattery") || line.contains("BatteryPack"))
}

impl BatteryProvider for DarwinBatteryProvider {
    fn count(&self) -> Result<u32> {
        let text = run_pmset()?;
        Ok(if find_battery_line(&text).is_some() { 1 } else { 0 })
    }

    fn stats(&self, index: u32) -> Result<BatteryStats> {
        if index != 0 {
            return Err(Error::not_found("battery.stats", index.to_string()));
        }
        let text = run_pmset()?;
        let line = find_battery_line(&text)
            .ok_or_else(|| Error::not_found("battery.stats", index.to_string()))?;
        let parsed = parse_battery_line(line)
            .ok_or_else(|| Error::parse("battery.stats", "unrecognized pmset battery line"))?;

        Ok(BatteryStats {
            percent: parsed.percent,
            remaining: parsed.remaining,
            charging: parsed.charging,
            design_capacity_uwh: 0,
            full_capacity_uwh: 0,
            current_charge_uwh: 0,
            current_energy_uw: 0,
            voltage: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_discharging_battery_line() {
        let line = "-InternalBattery-0 (id=1234)\t87%; discharging; 3:12 remaining present: true";
        let parsed = parse_battery_line(line).unwrap();
        assert_eq!(parsed.percent, 87.0);
        assert!(!parsed.charging);
        assert_eq!(parsed.remaining, Duration::from_secs(3 * 3600 + 12 * 60));
    }

    #[test]
    fn parses_a_charging_battery_line() {
        let line = "-InternalBattery-0 (id=1234)\t42%; charging; 1:05 remaining present: true";
        let parsed = parse_battery_line(line).unwrap();
        assert!(parsed.charging);
        assert_eq!(parsed.remaining, Duration::from_secs(3600 + 5 * 60));
    }

    #[test]
    fn missing_battery_line_on_ac_only_desktops_yields_no_match() {
        assert!(find_battery_line("No batteries available.\n").is_none());
    }
}
