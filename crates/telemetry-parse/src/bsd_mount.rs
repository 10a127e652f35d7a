//! Parser for Darwin's `mount` command output (remote Darwin filesystem
//! provider; the local provider reads the same table via `getmntinfo(3)`).

use telemetry_metrics::MountInfo;

/// Filesystem types/device prefixes treated as virtual and excluded, mirroring
/// the local Darwin provider's `devfs`/`map`/hidden-volume filtering.
const VIRTUAL_FS_TYPES: &[&str] = &["devfs", "autofs"];

/// Parse a line like `/dev/disk1s1 on / (apfs, local, journaled)` into a
/// `MountInfo`. Returns `None` for malformed lines or virtual filesystems.
fn parse_mount_line(line: &str) -> Option<MountInfo> {
    let (device, rest) = line.split_once(" on ")?;
    let device = device.trim();
    if device.starts_with("devfs") || device.starts_with("map ") {
        return None;
    }

    let open_paren = rest.rfind('(')?;
    let mount_point = rest[..open_paren].trim().to_string();
    let inside = rest[open_paren + 1..].trim_end().trim_end_matches(')');

    let mut parts = inside.split(", ");
    let fs_type = parts.next()?.to_string();
    if VIRTUAL_FS_TYPES.contains(&fs_type.as_str()) {
        return None;
    }
    if mount_point.starts_with("/System/Volumes/") {
        return None;
    }

    let options = parts.map(|s| s.to_string()).collect();

    Some(MountInfo {
        device: device.to_string(),
        mount_point,
        fs_type,
        options,
    })
}

/// Parse `mount`'s full output into `MountInfo` entries.
pub fn parse_mount_output(content: &str) -> Vec<MountInfo> {
    content.lines().filter_map(parse_mount_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_typical_apfs_line() {
        let mounts = parse_mount_output("/dev/disk1s1 on / (apfs, local, journaled)\n");
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].device, "/dev/disk1s1");
        assert_eq!(mounts[0].mount_point, "/");
        assert_eq!(mounts[0].fs_type, "apfs");
        assert_eq!(mounts[0].options, vec!["local", "journaled"]);
    }

    #[test]
    fn drops_devfs_and_autofs() {
        let mounts = parse_mount_output(
            "devfs on /dev (devfs, local, nobrowse)\nmap auto_home on /home (autofs, automounted, nobrowse)\n",
        );
        assert!(mounts.is_empty());
    }

    #[test]
    fn drops_hidden_system_volumes() {
        let mounts = parse_mount_output(
            "/dev/disk1s2 on /System/Volumes/Data (apfs, local, journaled)\n",
        );
        assert!(mounts.is_empty());
    }
}
