//! Battery metrics via `/sys/class/power_supply/*`.

use crate::{BatteryProvider, BatteryStats, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use telemetry_metrics::Error;

const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

pub struct LinuxBatteryProvider;

/// List power-supply directories whose `type` file reads `"Battery"`,
/// sorted by name so the index assigned to each is stable across calls.
fn battery_dirs() -> Result<Vec<PathBuf>> {
    let root = Path::new(POWER_SUPPLY_ROOT);
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .map_err(|e| Error::io("battery.count", e))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| read_attr(path, "type").map(|t| t == "Battery").unwrap_or(false))
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn read_attr(dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(dir.join(name)).ok().map(|s| s.trim().to_string())
}

fn read_u64(dir: &Path, name: &str) -> Option<u64> {
    read_attr(dir, name).and_then(|s| s.parse().ok())
}

fn read_i64(dir: &Path, name: &str) -> Option<i64> {
    read_attr(dir, name).and_then(|s| s.parse().ok())
}

impl BatteryProvider for LinuxBatteryProvider {
    fn count(&self) -> Result<u32> {
        Ok(battery_dirs()?.len() as u32)
    }

    fn stats(&self, index: u32) -> Result<BatteryStats> {
        let dirs = battery_dirs()?;
        let dir = dirs
            .get(index as usize)
            .ok_or_else(|| Error::not_found("battery.stats", index.to_string()))?;

        let percent = read_u64(dir, "capacity").unwrap_or(0) as f64;
        let charging = read_attr(dir, "status")
            .map(|s| s.eq_ignore_ascii_case("charging"))
            .unwrap_or(false);
        let voltage = read_u64(dir, "voltage_now").map(|uv| uv as f64 / 1_000_000.0).unwrap_or(0.0);

        // Preference order per spec: energy_now/full (uWh), else
        // charge_now/full * voltage / 1e6, else charge_counter * voltage / 1e6.
        let (design_capacity_uwh, full_capacity_uwh, current_charge_uwh) =
            if let (Some(now), Some(full)) = (read_u64(dir, "energy_now"), read_u64(dir, "energy_full")) {
                let design = read_u64(dir, "energy_full_design").unwrap_or(full);
                (design, full, now)
            } else if let (Some(now), Some(full)) = (read_u64(dir, "charge_now"), read_u64(dir, "charge_full")) {
                log::warn!(
                    "{}: no energy_now/energy_full, falling back to charge_now/charge_full * voltage",
                    dir.display()
                );
                let design = read_u64(dir, "charge_full_design").unwrap_or(full);
                let to_uwh = |charge_uah: u64| -> u64 {
                    ((charge_uah as f64) * voltage) as u64
                };
                (to_uwh(design), to_uwh(full), to_uwh(now))
            } else if let Some(counter) = read_u64(dir, "charge_counter") {
                log::warn!(
                    "{}: no energy_now or charge_now/charge_full, falling back to charge_counter * voltage",
                    dir.display()
                );
                let uwh = (counter as f64 * voltage).max(0.0) as u64;
                (uwh, uwh, uwh)
            } else {
                (0, 0, 0)
            };

        let power_now = read_i64(dir, "power_now")
            .map(|v| v as f64)
            .or_else(|| {
                read_i64(dir, "current_now").map(|current_ua| (current_ua as f64 / 1_000_000.0) * voltage * 1_000_000.0)
            })
            .unwrap_or(0.0)
            .abs();

        let remaining = if power_now > 0.0 {
            let energy_uwh = if charging {
                full_capacity_uwh.saturating_sub(current_charge_uwh)
            } else {
                current_charge_uwh
            };
            let hours = energy_uwh as f64 / power_now;
            Duration::from_secs_f64((hours * 3600.0).max(0.0))
        } else {
            Duration::ZERO
        };

        let current_energy_uw = read_i64(dir, "power_now")
            .or_else(|| {
                read_i64(dir, "current_now")
                    .map(|current_ua| ((current_ua as f64 / 1_000_000.0) * voltage * 1_000_000.0) as i64)
            })
            .unwrap_or(0);

        Ok(BatteryStats {
            percent,
            remaining,
            charging,
            design_capacity_uwh,
            full_capacity_uwh,
            current_charge_uwh,
            current_energy_uw,
            voltage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, value: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        write!(f, "{value}").unwrap();
    }

    #[test]
    fn energy_fields_take_precedence_over_charge_fields() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "type", "Battery");
        write(tmp.path(), "capacity", "85");
        write(tmp.path(), "status", "Discharging");
        write(tmp.path(), "voltage_now", "11000000");
        write(tmp.path(), "energy_now", "40000000");
        write(tmp.path(), "energy_full", "50000000");
        write(tmp.path(), "power_now", "8000000");

        // Exercise the parsing helpers directly (provider reads a fixed
        // sysfs root, so this validates the attribute readers that back it).
        assert_eq!(read_u64(tmp.path(), "capacity"), Some(85));
        assert_eq!(read_attr(tmp.path(), "status").as_deref(), Some("Discharging"));
        assert_eq!(read_u64(tmp.path(), "energy_now"), Some(40_000_000));
    }
}
