//! Parser for `df` output (remote filesystem-space/inode provider). Local
//! providers call `statvfs(2)`/`statfs(2)` directly; remote providers shell
//! out to `df` instead and parse its table.

use telemetry_metrics::{Error, Result};

/// Space usage in blocks, as reported by `df -B1`/`df -k`/etc. Byte
/// conversion is the caller's job (multiply by the block size the `df`
/// invocation used).
#[derive(Debug, Clone, Copy, Default)]
pub struct DfSpace {
    pub total_blocks: u64,
    pub used_blocks: u64,
    pub available_blocks: u64,
}

/// Inode usage, as reported by `df -i`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DfInodes {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

fn first_data_line(content: &str) -> Result<Vec<&str>> {
    content
        .lines()
        .skip(1)
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|fields| fields.len() >= 4)
        .ok_or_else(|| Error::parse("df", "no data row in output"))
}

/// Parse the data row of `df -B1 <mount>` / `df -k <mount>`. The header row
/// (`Filesystem ... Mounted on`) is skipped unconditionally.
pub fn parse_df_space(content: &str) -> Result<DfSpace> {
    let fields = first_data_line(content)?;
    Ok(DfSpace {
        total_blocks: fields[1].parse().unwrap_or(0),
        used_blocks: fields[2].parse().unwrap_or(0),
        available_blocks: fields[3].parse().unwrap_or(0),
    })
}

/// Parse the data row of `df -i <mount>`.
pub fn parse_df_inodes(content: &str) -> Result<DfInodes> {
    let fields = first_data_line(content)?;
    Ok(DfInodes {
        total: fields[1].parse().unwrap_or(0),
        used: fields[2].parse().unwrap_or(0),
        free: fields[3].parse().unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_b1_blocks() {
        let content = "Filesystem     1B-blocks       Used  Available Use% Mounted on\n\
/dev/sda1      107374182400 53687091200 53687091200  50% /\n";
        let space = parse_df_space(content).unwrap();
        assert_eq!(space.total_blocks, 107374182400);
        assert_eq!(space.used_blocks, 53687091200);
        assert_eq!(space.available_blocks, 53687091200);
    }

    #[test]
    fn parses_k_blocks() {
        let content = "Filesystem 1024-blocks    Used Available Capacity Mounted on\n\
/dev/disk1s1   976490576 52428800 924061776     6%    /\n";
        let space = parse_df_space(content).unwrap();
        assert_eq!(space.total_blocks, 976490576);
    }

    #[test]
    fn parses_inode_table() {
        let content = "Filesystem      Inodes   IUsed    IFree IUse% Mounted on\n\
/dev/sda1      6553600  234567  6319033    4% /\n";
        let inodes = parse_df_inodes(content).unwrap();
        assert_eq!(inodes.total, 6553600);
        assert_eq!(inodes.used, 234567);
        assert_eq!(inodes.free, 6319033);
    }

    #[test]
    fn empty_output_is_a_parse_error() {
        assert!(parse_df_space("Filesystem 1B-blocks Used Available Use% Mounted on\n").is_err());
    }
}
