//! Network metrics via `getifaddrs(3)` and `sysctl(NET_RT_IFLIST2)`.

use super::sysctl;
use crate::{NetworkProvider, NetworkStats, Result};
use telemetry_metrics::Error;

pub struct DarwinNetworkProvider;

impl DarwinNetworkProvider {
    fn read_all(&self) -> Result<Vec<NetworkStats>> {
        Ok(sysctl::interface_stats()?
            .into_iter()
            .map(|s| NetworkStats {
                interface: s.name,
                rx_bytes: s.rx_bytes,
                rx_packets: s.rx_packets,
                rx_errors: s.rx_errors,
                rx_drops: s.rx_drops,
                tx_bytes: s.tx_bytes,
                tx_packets: s.tx_packets,
                tx_errors: s.tx_errors,
                tx_drops: 0,
            })
            .collect())
    }
}

impl NetworkProvider for DarwinNetworkProvider {
    fn interfaces(&self) -> Result<Vec<String>> {
        // macOS excludes loopback from the interface list, unlike the other
        // platforms, which retain it.
        Ok(sysctl::interfaces()?
            .into_iter()
            .filter(|i| !i.is_loopback)
            .map(|i| i.name)
            .collect())
    }

    fn stats(&self, name: &str) -> Result<NetworkStats> {
        self.read_all()?
            .into_iter()
            .find(|s| s.interface == name)
            .ok_or_else(|| Error::not_found("network.stats", name))
    }

    fn all_stats(&self) -> Result<Vec<NetworkStats>> {
        let loopback_less: std::collections::HashSet<String> =
            self.interfaces()?.into_iter().collect();
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|s| loopback_less.contains(&s.interface))
            .collect())
    }
}
