//! Parser for `/proc/loadavg`.

use telemetry_metrics::{Error, Result};

/// Parse `/proc/loadavg` content, e.g. `"0.52 0.58 0.59 2/456 12345\n"`,
/// returning the three load averages.
pub fn parse_loadavg(content: &str) -> Result<(f64, f64, f64)> {
    let mut fields = content.split_whitespace();
    let one = fields
        .next()
        .ok_or_else(|| Error::parse("loadavg", "empty content"))?;
    let five = fields
        .next()
        .ok_or_else(|| Error::parse("loadavg", "missing 5-minute field"))?;
    let fifteen = fields
        .next()
        .ok_or_else(|| Error::parse("loadavg", "missing 15-minute field"))?;

    let parse = |s: &str| {
        s.parse::<f64>()
            .map_err(|e| Error::parse("loadavg", format!("bad load value {s}: {e}")))
    };

    Ok((parse(one)?, parse(five)?, parse(fifteen)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_loadavg_line() {
        let (one, five, fifteen) = parse_loadavg("0.52 0.58 0.59 2/456 12345\n").unwrap();
        assert_eq!(one, 0.52);
        assert_eq!(five, 0.58);
        assert_eq!(fifteen, 0.59);
    }

    #[test]
    fn rejects_empty_content() {
        assert!(parse_loadavg("").is_err());
    }
}
