//! Hooks fired while a scan walks the mount table.

use crate::collectors::filesystem::{Exclusion, UsageField};
use crate::error::RunError;
use crate::models::filesystem::StatRecord;
use crate::models::mount::MountRecord;
use tracing::{debug, trace, warn};

/// Receives per-mount scan events. Every hook defaults to doing nothing.
pub trait ScanObserver {
    fn on_excluded(&self, _mount: &MountRecord, _exclusion: Exclusion) {}

    fn on_measure_error(&self, _mount: &MountRecord, _error: &RunError) {}

    fn on_parse_error(&self, _mount: &MountRecord, _field: UsageField, _token: &str) {}

    /// The measurement succeeded but its report had too few fields; no record is emitted.
    fn on_malformed(&self, _mount: &MountRecord, _output: &str) {}

    fn on_sampled(&self, _stat: &StatRecord) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Forwards scan events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScanObserver for TracingObserver {
    fn on_excluded(&self, mount: &MountRecord, exclusion: Exclusion) {
        debug!(mount_point = %mount.mount_point, fs_type = %mount.fs_type,
               reason = exclusion.label(), "ignoring mount");
    }

    fn on_measure_error(&self, mount: &MountRecord, error: &RunError) {
        warn!(mount_point = %mount.mount_point, error = %error, "usage measurement failed");
    }

    fn on_parse_error(&self, mount: &MountRecord, field: UsageField, token: &str) {
        warn!(mount_point = %mount.mount_point, field = field.label(), token,
              "unparsable usage value");
    }

    fn on_malformed(&self, mount: &MountRecord, output: &str) {
        warn!(mount_point = %mount.mount_point, output = output.trim_end(),
              "usage report too short, mount skipped");
    }

    fn on_sampled(&self, stat: &StatRecord) {
        trace!(mount_point = %stat.mount.mount_point, size = stat.size_bytes,
               avail = stat.avail_bytes, free = stat.free_bytes,
               device_error = stat.device_error, "sampled");
    }
}
