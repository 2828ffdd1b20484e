use super::mount::MountRecord;
use serde::Serialize;

/// Usage sample for one mounted filesystem.
///
/// When `device_error` is set the byte counts are zero and mean "unknown",
/// not "empty filesystem".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatRecord {
    pub mount:       MountRecord,
    pub size_bytes:  f64,
    pub free_bytes:  f64,
    pub avail_bytes: f64,
    // The df-based measurement does not report inodes; both stay 0.
    pub files:       f64,
    pub files_free:  f64,
    // No read-only detection on this path; always false.
    pub read_only:   bool,
    pub device_error: bool,
}

impl StatRecord {
    pub fn measured(mount: MountRecord, size_bytes: f64, avail_bytes: f64, free_bytes: f64) -> Self {
        Self {
            mount,
            size_bytes,
            free_bytes,
            avail_bytes,
            files:        0.0,
            files_free:   0.0,
            read_only:    false,
            device_error: false,
        }
    }

    pub fn failed(mount: MountRecord) -> Self {
        Self {
            mount,
            size_bytes:   0.0,
            free_bytes:   0.0,
            avail_bytes:  0.0,
            files:        0.0,
            files_free:   0.0,
            read_only:    false,
            device_error: true,
        }
    }

    /// Share of the filesystem not available to unprivileged users, in percent.
    ///
    /// Computed from `free_bytes`, which carries df's "Available" column;
    /// `avail_bytes` carries df's "Used" column.
    pub fn use_pct(&self) -> f64 {
        if self.device_error || self.size_bytes <= 0.0 { return 0.0; }
        ((self.size_bytes - self.free_bytes) / self.size_bytes * 100.0).clamp(0.0, 100.0)
    }

    pub fn status_label(&self) -> &'static str {
        if self.device_error { "ERROR" } else { "OK" }
    }
}
