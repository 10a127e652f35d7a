//! Network metrics via `GetIfTable2`.

use crate::{NetworkProvider, NetworkStats, Result};
use telemetry_metrics::Error;
use windows::Win32::NetworkManagement::IpHelper::{FreeMibTable, GetIfTable2, MIB_IF_TABLE2};
use windows::Win32::NetworkManagement::Ndis::IfOperStatusUp;

pub struct WindowsNetworkProvider;

fn read_all() -> Result<Vec<NetworkStats>> {
    let mut out = Vec::new();
    unsafe {
        let mut table: *mut MIB_IF_TABLE2 = std::ptr::null_mut();
        GetIfTable2(&mut table)
            .ok()
            .map_err(|e| Error::io("network.all_stats", std::io::Error::other(e.to_string())))?;
        if table.is_null() {
            return Ok(out);
        }

        let num_entries = (*table).NumEntries as usize;
        let entries = std::slice::from_raw_parts((*table).Table.as_ptr(), num_entries);

        for entry in entries {
            if entry.OperStatus != IfOperStatusUp {
                continue;
            }
            let name_end = entry.Alias.iter().position(|&c| c == 0).unwrap_or(entry.Alias.len());
            let name = String::from_utf16_lossy(&entry.Alias[..name_end]);

            out.push(NetworkStats {
                interface: name,
                rx_bytes: entry.InOctets,
                rx_packets: entry.InUcastPkts + entry.InNUcastPkts,
                rx_errors: entry.InErrors,
                rx_drops: entry.InDiscards,
                tx_bytes: entry.OutOctets,
                tx_packets: entry.OutUcastPkts + entry.OutNUcastPkts,
                tx_errors: entry.OutErrors,
                tx_drops: entry.OutDiscards,
            });
        }

        FreeMibTable(table as *const _);
    }
    Ok(out)
}

impl NetworkProvider for WindowsNetworkProvider {
    fn interfaces(&self) -> Result<Vec<String>> {
        Ok(read_all()?.into_iter().map(|s| s.interface).collect())
    }

    fn stats(&self, name: &str) -> Result<NetworkStats> {
        read_all()?
            .into_iter()
            .find(|s| s.interface == name)
            .ok_or_else(|| Error::not_found("network.stats", name))
    }

    fn all_stats(&self) -> Result<Vec<NetworkStats>> {
        read_all()
    }
}
