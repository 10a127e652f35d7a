//! Temperature and fan sensors via `/sys/class/hwmon`.

use crate::{Result, SensorProvider, SensorReading};
use std::fs;
use std::path::Path;

const HWMON_ROOT: &str = "/sys/class/hwmon";

pub struct LinuxSensorProvider;

fn read_attr(dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(dir.join(name)).ok().map(|s| s.trim().to_string())
}

/// Collect every `{kind}N_input` reading under every `hwmonX` directory,
/// paired with its optional `{kind}N_label` and `{kind}N_crit`.
///
/// `scale` converts the raw integer (millidegrees for temperatures, RPM
/// units for fans) to the unit reported in [`SensorReading::unit`].
fn read_hwmon_kind(kind: &str, unit: &str, scale: f64) -> Vec<SensorReading> {
    let root = Path::new(HWMON_ROOT);
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for hwmon_entry in entries.flatten() {
        let hwmon_dir = hwmon_entry.path();
        if !hwmon_dir.is_dir() {
            continue;
        }
        let device = read_attr(&hwmon_dir, "name").unwrap_or_else(|| {
            hwmon_dir.file_name().and_then(|n| n.to_str()).unwrap_or("hwmon").to_string()
        });

        let Ok(files) = fs::read_dir(&hwmon_dir) else {
            continue;
        };
        for file_entry in files.flatten() {
            let name = file_entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(key) = name.strip_suffix("_input") else { continue };
            if !key.starts_with(kind) {
                continue;
            }

            let Some(raw) = read_attr(&hwmon_dir, name).and_then(|s| s.parse::<f64>().ok()) else {
                continue;
            };
            let label = read_attr(&hwmon_dir, &format!("{key}_label")).unwrap_or_else(|| {
                log::warn!("{}: no {key}_label, falling back to {key}", hwmon_dir.display());
                key.to_string()
            });
            let critical = read_attr(&hwmon_dir, &format!("{key}_crit"))
                .and_then(|s| s.parse::<f64>().ok())
                .map(|v| v * scale)
                .unwrap_or(0.0);

            out.push(SensorReading {
                device: device.clone(),
                label,
                value: raw * scale,
                unit: unit.to_string(),
                critical,
            });
        }
    }
    out
}

/// Battery temperature, reported in tenths of a degree C, folded into the
/// same `SensorReading` shape as hwmon temperatures.
fn read_battery_temperature() -> Vec<SensorReading> {
    let power_supply = Path::new("/sys/class/power_supply");
    let Ok(entries) = fs::read_dir(power_supply) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if read_attr(&dir, "type").as_deref() != Some("Battery") {
            continue;
        }
        if let Some(tenths) = read_attr(&dir, "temp").and_then(|s| s.parse::<f64>().ok()) {
            let device = dir.file_name().and_then(|n| n.to_str()).unwrap_or("battery").to_string();
            out.push(SensorReading {
                device,
                label: "battery".to_string(),
                value: tenths / 10.0,
                unit: "°C".to_string(),
                critical: 0.0,
            });
        }
    }
    out
}

impl SensorProvider for LinuxSensorProvider {
    fn temperatures(&self) -> Result<Vec<SensorReading>> {
        let mut readings = read_hwmon_kind("temp", "°C", 0.001);
        readings.extend(read_battery_temperature());
        Ok(readings)
    }

    fn fans(&self) -> Result<Vec<SensorReading>> {
        Ok(read_hwmon_kind("fan", "RPM", 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_hwmon_root_yields_empty_list_not_an_error() {
        // read_hwmon_kind treats a missing directory as "no sensors", which
        // is the contract SensorProvider::fans documents for platforms with
        // no fan-capable hwmon devices.
        let readings = read_hwmon_kind("fan", "RPM", 1.0);
        // Either empty (sandboxed CI has no hwmon tree) or real hardware data;
        // either way this must not panic or error.
        let _ = readings;
    }
}
