use super::runner::PrivilegedRunner;
use crate::error::SampleError;
use crate::models::mount::MountRecord;

/// Read the host mount table through `runner`.
///
/// Only a failed read is an error; unusable lines are skipped.
pub fn list_mounts<R>(runner: &R) -> Result<Vec<MountRecord>, SampleError>
where
    R: PrivilegedRunner + ?Sized,
{
    let content = runner.read_mount_table().map_err(SampleError::Enumeration)?;
    Ok(parse_mount_table(&content))
}

/// Parse `/proc/mounts` content, keeping source order and duplicates.
pub fn parse_mount_table(content: &str) -> Vec<MountRecord> {
    let mut v = Vec::new();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() <= 3 { continue; }
        v.push(MountRecord {
            device:      unescape_mount_field(fields[0]),
            mount_point: unescape_mount_field(fields[1]),
            fs_type:     fields[2].to_string(),
            options:     fields[3].split(',').map(str::to_string).collect(),
        });
    }
    v
}

/// Decode the kernel's octal escapes (`\040` for space and friends).
fn unescape_mount_field(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..=i + 3].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            if let Ok(n) = u8::from_str_radix(&value[i + 1..i + 4], 8) {
                out.push(n);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::mock::{MockOutcome, MockRunner};

    #[test]
    fn parses_device_mount_point_and_type() {
        let mounts = parse_mount_table(
            "/dev/sda1 / ext4 rw,relatime 0 0\n\
             proc /proc proc rw,nosuid 0 0\n",
        );
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].device, "/dev/sda1");
        assert_eq!(mounts[0].mount_point, "/");
        assert_eq!(mounts[0].fs_type, "ext4");
        assert_eq!(mounts[0].options, ["rw", "relatime"]);
        assert_eq!(mounts[1].fs_type, "proc");
    }

    #[test]
    fn skips_lines_with_three_fields_or_fewer() {
        let mounts = parse_mount_table(
            "\n\
             garbage\n\
             /dev/sda1 / ext4\n\
             /dev/sdb1 /data\n\
             /dev/sdc1 /backup xfs rw\n",
        );
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_point, "/backup");
    }

    #[test]
    fn keeps_duplicates_in_source_order() {
        let mounts = parse_mount_table(
            "/dev/sda1 /mnt ext4 rw 0 0\n\
             /dev/sdb1 /mnt xfs rw 0 0\n",
        );
        let devices: Vec<&str> = mounts.iter().map(|m| m.device.as_str()).collect();
        assert_eq!(devices, ["/dev/sda1", "/dev/sdb1"]);
    }

    #[test]
    fn decodes_octal_escapes() {
        let mounts = parse_mount_table("/dev/sdd1 /media/My\\040Disk vfat rw 0 0\n");
        assert_eq!(mounts[0].mount_point, "/media/My Disk");
        assert_eq!(unescape_mount_field("tab\\011end"), "tab\tend");
        assert_eq!(unescape_mount_field("back\\134slash"), "back\\slash");
        // Not a complete escape: left untouched.
        assert_eq!(unescape_mount_field("odd\\04"), "odd\\04");
    }

    #[test]
    fn failed_read_is_an_enumeration_error() {
        let mut runner = MockRunner::new();
        runner.set_mount_table(MockOutcome::exit(1, "nsenter: reassociate to namespace 'ns/mnt' failed"));
        let err = list_mounts(&runner).unwrap_err();
        assert!(matches!(err, SampleError::Enumeration(_)));
    }

    #[test]
    fn garbled_output_is_not_an_error() {
        let runner = MockRunner::with_mount_table("??\n\u{fffd}\u{fffd}\n");
        assert!(list_mounts(&runner).unwrap().is_empty());
    }
}
