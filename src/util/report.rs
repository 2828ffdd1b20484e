use crate::models::filesystem::StatRecord;
use crate::util::human::{fmt_bytes, fmt_pct};
use serde_json::{json, Value};

/// Render one scan as a fixed-width table.
pub fn generate(stats: &[StatRecord]) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut out = String::new();

    let errors = stats.iter().filter(|s| s.device_error).count();
    out.push_str(&format!("── Filesystems ({}, {} error) {} ──\n", stats.len(), errors, now));
    // Avail holds df's "Used" column and Free holds df's "Available" column.
    out.push_str(&format!(
        "  {:<24} {:<9} {:<14} {:>10} {:>10} {:>10} {:>6}  {}\n",
        "Mount", "FS", "Device", "Size", "Avail", "Free", "Use%", "Status"
    ));
    out.push_str(&format!("  {}\n", "─".repeat(96)));
    out.push_str("  (Avail = df Used column, Free = df Available column)\n");

    for s in stats {
        let (size, avail, free, pct) = if s.device_error {
            ("?".to_string(), "?".to_string(), "?".to_string(), "?".to_string())
        } else {
            (fmt_bytes(s.size_bytes), fmt_bytes(s.avail_bytes), fmt_bytes(s.free_bytes), fmt_pct(s.use_pct()))
        };
        out.push_str(&format!(
            "  {:<24} {:<9} {:<14} {:>10} {:>10} {:>10} {:>6}  {}\n",
            s.mount.mount_point, s.mount.fs_type, s.mount.short_device(),
            size, avail, free, pct, s.status_label(),
        ));
    }
    out
}

/// JSON snapshot of one scan, raw values plus human-readable sizes.
pub fn snapshot(stats: &[StatRecord]) -> Value {
    let filesystems: Vec<Value> = stats.iter().map(|s| {
        json!({
            "device":       s.mount.device,
            "mountpoint":   s.mount.mount_point,
            "fstype":       s.mount.fs_type,
            "size":         s.size_bytes,
            "avail":        s.avail_bytes,
            "free":         s.free_bytes,
            "files":        s.files,
            "files_free":   s.files_free,
            "readonly":     s.read_only,
            "device_error": s.device_error,
            "size_hr":      fmt_bytes(s.size_bytes),
            "avail_hr":     fmt_bytes(s.avail_bytes),
            "use_pct":      s.use_pct(),
        })
    }).collect();

    json!({
        "mountstat_version": env!("CARGO_PKG_VERSION"),
        "timestamp":   chrono::Local::now().to_rfc3339(),
        "filesystems": filesystems,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mount::MountRecord;

    fn sample_stats() -> Vec<StatRecord> {
        vec![
            StatRecord::measured(MountRecord::new("/dev/sda1", "/", "ext4"), 1_073_741_824.0, 600_000_000.0, 536_870_912.0),
            StatRecord::failed(MountRecord::new("server:/export", "/nfs", "nfs4")),
        ]
    }

    #[test]
    fn table_marks_errors_as_unknown() {
        let text = generate(&sample_stats());
        assert!(text.contains("(2, 1 error)"));
        let nfs_line = text.lines().find(|l| l.contains("/nfs")).unwrap();
        assert!(nfs_line.contains('?'));
        assert!(nfs_line.trim_end().ends_with("ERROR"));
        let root_line = text.lines().find(|l| l.contains("ext4")).unwrap();
        assert!(root_line.contains("1.0 GB"));
        assert!(root_line.contains("50.0%"));
    }

    #[test]
    fn table_explains_avail_and_free_columns() {
        let text = generate(&sample_stats());
        let header = text.lines().position(|l| l.contains("Avail") && l.contains("Status")).unwrap();
        let note = text.lines().nth(header + 2).unwrap();
        assert!(note.contains("Avail = df Used column"));
        assert!(note.contains("Free = df Available column"));
    }

    #[test]
    fn snapshot_carries_every_field() {
        let v = snapshot(&sample_stats());
        let fs = v["filesystems"].as_array().unwrap();
        assert_eq!(fs.len(), 2);
        assert_eq!(fs[0]["mountpoint"], "/");
        assert_eq!(fs[0]["size"], 1_073_741_824.0);
        assert_eq!(fs[0]["device_error"], false);
        assert_eq!(fs[1]["device_error"], true);
        assert_eq!(fs[1]["avail"], 0.0);
    }
}
