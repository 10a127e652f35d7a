//! Parser for `/proc/mounts`-style mount tables.

use telemetry_metrics::MountInfo;

/// Filesystem types treated as virtual/pseudo and excluded from
/// [`parse_mounts`]'s output: they don't correspond to a physical or
/// network-backed store worth reporting space usage for.
const VIRTUAL_FS_TYPES: &[&str] = &[
    "proc",
    "sysfs",
    "devtmpfs",
    "devpts",
    "tmpfs",
    "cgroup",
    "cgroup2",
    "pstore",
    "bpf",
    "tracefs",
    "debugfs",
    "securityfs",
    "configfs",
    "mqueue",
    "hugetlbfs",
    "autofs",
    "fusectl",
    "rpc_pipefs",
];

/// Decode `/proc/mounts` octal escapes (`\040` for space, `\011` for tab,
/// `\012` for newline, `\134` for backslash) in a mount-point path.
pub fn unescape_octal(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let octal = &raw[i + 1..i + 4];
            if let Ok(value) = u8::from_str_radix(octal, 8) {
                out.push(value as char);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Parse `/proc/mounts` (or `/proc/self/mounts`) content into [`MountInfo`]
/// entries, dropping virtual filesystem types listed in
/// [`VIRTUAL_FS_TYPES`]. Lines with fewer than 4 fields are skipped.
pub fn parse_mounts(content: &str) -> Vec<MountInfo> {
    parse_mounts_excluding(content, &[])
}

/// Like [`parse_mounts`], but also drops any filesystem type named in
/// `extra_excludes`. Used on Android, where `selinuxfs` and `functionfs`
/// show up in `/proc/mounts` alongside the usual virtual filesystem types
/// but aren't in the shared [`VIRTUAL_FS_TYPES`] list since they're specific
/// to that platform.
pub fn parse_mounts_excluding(content: &str, extra_excludes: &[&str]) -> Vec<MountInfo> {
    let mut out = Vec::new();

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        let device = fields[0].to_string();
        let mount_point = unescape_octal(fields[1]);
        let fs_type = fields[2].to_string();

        if VIRTUAL_FS_TYPES.contains(&fs_type.as_str()) || extra_excludes.contains(&fs_type.as_str()) {
            continue;
        }

        let options = fields[3].split(',').map(|s| s.to_string()).collect();

        out.push(MountInfo {
            device,
            mount_point,
            fs_type,
            options,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescapes_space_in_mount_point() {
        assert_eq!(unescape_octal("/mnt/My\\040Drive"), "/mnt/My Drive");
    }

    #[test]
    fn unescapes_multiple_octal_sequences() {
        assert_eq!(unescape_octal("/a\\040b\\011c"), "/a b\tc");
    }

    #[test]
    fn leaves_plain_paths_untouched() {
        assert_eq!(unescape_octal("/home/user"), "/home/user");
    }

    #[test]
    fn filters_out_virtual_filesystems() {
        let content = "\
/dev/sda1 / ext4 rw,relatime 0 0
proc /proc proc rw,nosuid 0 0
tmpfs /run tmpfs rw,nosuid,size=819200k 0 0
/dev/sdb1 /mnt/data ext4 rw,noatime 0 0
";
        let mounts = parse_mounts(content);
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].mount_point, "/");
        assert_eq!(mounts[1].mount_point, "/mnt/data");
    }

    #[test]
    fn android_exclusions_drop_selinuxfs_and_functionfs() {
        let content = "\
/dev/block/dm-0 / ext4 ro 0 0
selinuxfs /sys/fs/selinux selinuxfs rw,relatime 0 0
none /dev/usb-ffs/adb functionfs rw 0 0
/dev/block/dm-1 /data ext4 rw,nosuid 0 0
";
        let mounts = parse_mounts_excluding(content, &["selinuxfs", "functionfs"]);
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].mount_point, "/");
        assert_eq!(mounts[1].mount_point, "/data");
    }

    #[test]
    fn splits_options_on_comma() {
        let content = "/dev/sda1 / ext4 rw,relatime,errors=remount-ro 0 0\n";
        let mounts = parse_mounts(content);
        assert_eq!(
            mounts[0].options,
            vec!["rw", "relatime", "errors=remount-ro"]
        );
    }
}
