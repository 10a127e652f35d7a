//! Network metrics via `/proc/net/dev`.

use crate::{NetworkProvider, NetworkStats, Result};
use std::fs;
use telemetry_metrics::Error;
use telemetry_parse::parse_net_dev;

const PROC_NET_DEV: &str = "/proc/net/dev";

pub struct LinuxNetworkProvider;

impl LinuxNetworkProvider {
    fn read_all(&self) -> Result<Vec<NetworkStats>> {
        let content =
            fs::read_to_string(PROC_NET_DEV).map_err(|e| Error::io("network.all_stats", e))?;
        parse_net_dev(&content)
    }
}

impl NetworkProvider for LinuxNetworkProvider {
    fn interfaces(&self) -> Result<Vec<String>> {
        Ok(self.read_all()?.into_iter().map(|s| s.interface).collect())
    }

    fn stats(&self, name: &str) -> Result<NetworkStats> {
        self.read_all()?
            .into_iter()
            .find(|s| s.interface == name)
            .ok_or_else(|| Error::not_found("network.stats", name))
    }

    fn all_stats(&self) -> Result<Vec<NetworkStats>> {
        self.read_all()
    }
}
