//! BSD/Darwin `netstat` output parsing (remote Darwin network provider).

use telemetry_metrics::Result;

/// Interface names from `netstat -i`, deduplicated and with loopback
/// interfaces (`lo0`, `lo1`, ...) dropped to match the local Darwin
/// provider's `getifaddrs`-based filtering.
pub fn parse_netstat_interface_list(content: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for line in content.lines().skip(1) {
        let Some(name) = line.split_whitespace().next() else {
            continue;
        };
        if name.starts_with("lo") {
            continue;
        }
        if seen.insert(name.to_string()) {
            out.push(name.to_string());
        }
    }
    out
}

/// One parsed counter row from `netstat -ib -I <iface>`.
#[derive(Debug, Clone, Default)]
pub struct NetstatCounters {
    pub rx_packets: u64,
    pub rx_errors: u64,
    pub rx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
    pub tx_bytes: u64,
    pub collisions: u64,
}

/// Parse `netstat -ib -I <iface>`'s output. Every row belongs to the
/// requested interface; the link-layer row (`Network` column `<Link#N>`) is
/// preferred since the per-address rows repeat the same counters, but any
/// row is accepted as a fallback so long as it has the expected column
/// count.
pub fn parse_netstat_ib(content: &str) -> Result<NetstatCounters> {
    let mut fallback = None;
    for line in content.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 11 {
            continue;
        }
        let counters = NetstatCounters {
            rx_packets: fields[4].parse().unwrap_or(0),
            rx_errors: fields[5].parse().unwrap_or(0),
            rx_bytes: fields[6].parse().unwrap_or(0),
            tx_packets: fields[7].parse().unwrap_or(0),
            tx_errors: fields[8].parse().unwrap_or(0),
            tx_bytes: fields[9].parse().unwrap_or(0),
            collisions: fields[10].parse().unwrap_or(0),
        };
        if fields[2].starts_with("<Link") {
            return Ok(counters);
        }
        fallback.get_or_insert(counters);
    }
    Ok(fallback.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const IFACE_LIST: &str = "Name  Mtu   Network       Address            Ipkts Ierrs    Ibytes    Opkts Oerrs    Obytes  Coll\n\
lo0   16384 <Link#1>                         100     0     10000      100     0     10000     0\n\
en0   1500  <Link#4>      a4:83:e7:12:34:56  500     0     50000      400     0     40000     0\n\
en0   1500  192.168.1.0/24 192.168.1.5        500     0     50000      400     0     40000     0\n";

    #[test]
    fn drops_loopback_and_dedupes() {
        let names = parse_netstat_interface_list(IFACE_LIST);
        assert_eq!(names, vec!["en0".to_string()]);
    }

    #[test]
    fn prefers_the_link_layer_row() {
        let counters = parse_netstat_ib(IFACE_LIST).unwrap();
        assert_eq!(counters.rx_bytes, 50000);
        assert_eq!(counters.tx_bytes, 40000);
        assert_eq!(counters.rx_packets, 500);
    }
}
