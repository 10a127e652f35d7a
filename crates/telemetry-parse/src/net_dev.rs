//! Parser for `/proc/net/dev`.

use telemetry_metrics::{Error, NetworkStats, Result};

/// Parse `/proc/net/dev` content into one [`NetworkStats`] per interface.
///
/// The file has two header lines followed by one `iface: rx... tx...` line
/// per interface, 16 numeric fields total (8 receive, 8 transmit). Lines
/// with fewer fields than required are skipped rather than failing the
/// whole parse, since a partial/truncated read shouldn't take down every
/// other interface's stats.
pub fn parse_net_dev(content: &str) -> Result<Vec<NetworkStats>> {
    let mut out = Vec::new();

    for line in content.lines().skip(2) {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        let interface = name.trim().to_string();
        if interface.is_empty() {
            continue;
        }

        let fields: Vec<&str> = rest.split_whitespace().collect();
        if fields.len() < 16 {
            continue;
        }

        let num = |s: &str| -> Result<u64> {
            s.parse::<u64>()
                .map_err(|e| Error::parse("net_dev", format!("bad counter {s}: {e}")))
        };

        out.push(NetworkStats {
            interface,
            rx_bytes: num(fields[0])?,
            rx_packets: num(fields[1])?,
            rx_errors: num(fields[2])?,
            rx_drops: num(fields[3])?,
            tx_bytes: num(fields[8])?,
            tx_packets: num(fields[9])?,
            tx_errors: num(fields[10])?,
            tx_drops: num(fields[11])?,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  123456     200    0    0    0     0          0         0   123456     200    0    0    0     0       0          0
  eth0: 987654321 654321    1    2    0     0          0         3 123456789  111111    4    5    0     0       0          0
";

    #[test]
    fn parses_loopback_and_ethernet() {
        let stats = parse_net_dev(SAMPLE).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].interface, "lo");
        assert_eq!(stats[0].rx_bytes, 123456);
        assert_eq!(stats[1].interface, "eth0");
        assert_eq!(stats[1].tx_bytes, 123456789);
        assert_eq!(stats[1].rx_errors, 1);
        assert_eq!(stats[1].tx_drops, 5);
    }

    #[test]
    fn skips_short_lines_without_failing() {
        let stats = parse_net_dev("Inter-|\n face |\n  eth9: 1 2 3\n").unwrap();
        assert!(stats.is_empty());
    }
}
