//! Temperature and fan sensors: hwmon plus Android's `thermal_zone` sysfs
//! variant.

use crate::{Result, SensorProvider, SensorReading};
use std::fs;
use std::path::Path;

const HWMON_ROOT: &str = "/sys/class/hwmon";
const THERMAL_ROOT: &str = "/sys/class/thermal";

fn read_attr(dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(dir.join(name)).ok().map(|s| s.trim().to_string())
}

pub struct AndroidSensorProvider;

fn read_hwmon_fans() -> Vec<SensorReading> {
    let root = Path::new(HWMON_ROOT);
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for hwmon_entry in entries.flatten() {
        let hwmon_dir = hwmon_entry.path();
        let device = read_attr(&hwmon_dir, "name").unwrap_or_else(|| "hwmon".to_string());
        let Ok(files) = fs::read_dir(&hwmon_dir) else { continue };
        for file_entry in files.flatten() {
            let name = file_entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(key) = name.strip_suffix("_input") else { continue };
            if !key.starts_with("fan") {
                continue;
            }
            let Some(rpm) = read_attr(&hwmon_dir, name).and_then(|s| s.parse::<f64>().ok()) else {
                continue;
            };
            let label = read_attr(&hwmon_dir, &format!("{key}_label")).unwrap_or_else(|| key.to_string());
            out.push(SensorReading {
                device: device.clone(),
                label,
                value: rpm,
                unit: "RPM".to_string(),
                critical: 0.0,
            });
        }
    }
    out
}

/// Scan `thermal_zoneN/temp` (millidegrees C) plus its `trip_point_*_type`
/// siblings for the one marked `"critical"`, per the spec's Android sysfs
/// variant.
fn read_thermal_zones() -> Vec<SensorReading> {
    let root = Path::new(THERMAL_ROOT);
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let zone_dir = entry.path();
        let name = zone_dir.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !name.starts_with("thermal_zone") {
            continue;
        }

        let Some(milli_c) = read_attr(&zone_dir, "temp").and_then(|s| s.parse::<f64>().ok()) else {
            continue;
        };
        let label = read_attr(&zone_dir, "type").unwrap_or_else(|| name.to_string());
        let critical = find_critical_trip_point(&zone_dir).unwrap_or(0.0);

        out.push(SensorReading {
            device: name.to_string(),
            label,
            value: milli_c / 1000.0,
            unit: "°C".to_string(),
            critical,
        });
    }
    out
}

fn find_critical_trip_point(zone_dir: &Path) -> Option<f64> {
    let Ok(files) = fs::read_dir(zone_dir) else {
        return None;
    };
    for entry in files.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(index) = name
            .strip_prefix("trip_point_")
            .and_then(|rest| rest.strip_suffix("_type"))
        else {
            continue;
        };
        if read_attr(zone_dir, name) == Some("critical".to_string()) {
            let temp_file = format!("trip_point_{index}_temp");
            return read_attr(zone_dir, &temp_file).and_then(|s| s.parse::<f64>().ok()).map(|v| v / 1000.0);
        }
    }
    None
}

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

impl SensorProvider for AndroidSensorProvider {
    fn temperatures(&self) -> Result<Vec<SensorReading>> {
        let mut readings = read_thermal_zones();
        readings.extend(read_battery_temperature());
        Ok(readings)
    }

    fn fans(&self) -> Result<Vec<SensorReading>> {
        Ok(read_hwmon_fans())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_thermal_root_yields_empty_list() {
        // Devices without the thermal_zone sysfs tree (rare, but some
        // minimal Android builds omit it) must not error.
        let readings = read_thermal_zones();
        let _ = readings;
    }
}
