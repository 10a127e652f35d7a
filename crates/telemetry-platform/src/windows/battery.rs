//! Battery metrics via `GetSystemPowerStatus`.

use crate::{BatteryProvider, BatteryStats, Result};
use std::time::Duration;
use telemetry_metrics::Error;
use windows::Win32::System::Power::{GetSystemPowerStatus, SYSTEM_POWER_STATUS};

pub struct WindowsBatteryProvider;

const BATTERY_FLAG_NO_BATTERY: u8 = 128;

fn query() -> Result<SYSTEM_POWER_STATUS> {
    let mut status = SYSTEM_POWER_STATUS::default();
    unsafe { GetSystemPowerStatus(&mut status) }
        .map_err(|e| Error::io("battery.count", std::io::Error::other(e.to_string())))?;
    Ok(status)
}

impl BatteryProvider for WindowsBatteryProvider {
    fn count(&self) -> Result<u32> {
        let status = query()?;
        Ok(if status.BatteryFlag as u8 & BATTERY_FLAG_NO_BATTERY != 0 { 0 } else { 1 })
    }

    fn stats(&self, index: u32) -> Result<BatteryStats> {
        if index != 0 {
            return Err(Error::not_found("battery.stats", index.to_string()));
        }
        let status = query()?;
        if status.BatteryFlag as u8 & BATTERY_FLAG_NO_BATTERY != 0 {
            return Err(Error::not_found("battery.stats", index.to_string()));
        }

        let percent = if status.BatteryLifePercent <= 100 {
            status.BatteryLifePercent as f64
        } else {
            0.0
        };
        // AC line status 1 means mains power connected (charging or full).
        let charging = status.ACLineStatus == 1;
        let remaining = if status.BatteryLifeTime != u32::MAX {
            Duration::from_secs(status.BatteryLifeTime as u64)
        } else {
            Duration::ZERO
        };

        Ok(BatteryStats {
            percent,
            remaining,
            charging,
            design_capacity_uwh: 0,
            full_capacity_uwh: 0,
            current_charge_uwh: 0,
            current_energy_uw: 0,
            voltage: 0.0,
        })
    }
}
