//! In-memory runner for exercising the sampler without `nsenter`.
//!
//! `MockRunner` returns canned mount tables and `df` reports, and remembers
//! every mount point it was asked to measure so tests can assert that
//! excluded mounts never reached the measurement step.

use super::runner::PrivilegedRunner;
use crate::error::RunError;
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

/// Canned result of one mock invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    Output(String),
    Exit { status: String, stderr: String },
    SpawnFailure,
    TimedOut(Duration),
}

impl MockOutcome {
    pub fn exit(code: i32, stderr: impl Into<String>) -> Self {
        MockOutcome::Exit { status: format!("exit status: {code}"), stderr: stderr.into() }
    }

    fn resolve(&self, program: &str) -> Result<String, RunError> {
        let program = program.to_string();
        match self {
            MockOutcome::Output(text) => Ok(text.clone()),
            MockOutcome::Exit { status, stderr } => Err(RunError::Exit {
                program,
                status: status.clone(),
                stderr: stderr.clone(),
            }),
            MockOutcome::SpawnFailure => Err(RunError::Spawn {
                program,
                source: io::Error::new(io::ErrorKind::NotFound, "mock spawn failure"),
            }),
            MockOutcome::TimedOut(timeout) => Err(RunError::TimedOut { program, timeout: *timeout }),
        }
    }
}

#[derive(Debug)]
pub struct MockRunner {
    mount_table:  MockOutcome,
    measurements: HashMap<String, MockOutcome>,
    measured:     Mutex<Vec<String>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self {
            mount_table:  MockOutcome::Output(String::new()),
            measurements: HashMap::new(),
            measured:     Mutex::new(Vec::new()),
        }
    }
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner whose mount table contains `content`.
    pub fn with_mount_table(content: impl Into<String>) -> Self {
        Self { mount_table: MockOutcome::Output(content.into()), ..Self::default() }
    }

    pub fn set_mount_table(&mut self, outcome: MockOutcome) {
        self.mount_table = outcome;
    }

    pub fn add_measurement(&mut self, mount_point: impl Into<String>, outcome: MockOutcome) {
        self.measurements.insert(mount_point.into(), outcome);
    }

    /// Registers a realistic `df -T -B 1` report for `mount_point`.
    pub fn add_df(&mut self, mount_point: &str, device: &str, fs_type: &str, size: u64, used: u64, avail: u64) {
        let pct = if size == 0 { 0 } else { used * 100 / size };
        let report = format!(
            "Filesystem     Type     1B-blocks        Used   Available Use% Mounted on\n\
             {device:<14} {fs_type:<5} {size:>12} {used:>11} {avail:>11} {pct:>3}% {mount_point}\n"
        );
        self.add_measurement(mount_point, MockOutcome::Output(report));
    }

    /// Mount points passed to `measure`, in call order.
    pub fn measured_paths(&self) -> Vec<String> {
        self.measured.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// A small host: root and data disks, pseudo filesystems, and a read-only ISO.
    pub fn typical_host() -> Self {
        let mut runner = Self::with_mount_table(
            "/dev/sda1 / ext4 rw,relatime 0 0\n\
             proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0\n\
             sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0\n\
             devtmpfs /dev devtmpfs rw,nosuid,size=4010512k 0 0\n\
             devpts /dev/pts devpts rw,nosuid,noexec,relatime 0 0\n\
             systemd-1 /proc/sys/fs/binfmt_misc autofs rw,relatime 0 0\n\
             tmpfs /run tmpfs rw,nosuid,nodev,mode=755 0 0\n\
             /dev/sdb1 /data xfs rw,noatime 0 0\n\
             /dev/sr0 /media/cdrom iso9660 ro,nosuid,nodev 0 0\n",
        );
        runner.add_df("/", "/dev/sda1", "ext4", 105_089_261_568, 42_085_752_832, 57_617_149_952);
        runner.add_df("/run", "tmpfs", "tmpfs", 822_149_120, 2_125_824, 820_023_296);
        runner.add_df("/data", "/dev/sdb1", "xfs", 2_000_263_573_504, 1_500_000_000_000, 500_263_573_504);
        runner.add_df("/media/cdrom", "/dev/sr0", "iso9660", 4_700_372_992, 4_700_372_992, 0);
        runner
    }
}

impl PrivilegedRunner for MockRunner {
    fn read_mount_table(&self) -> Result<String, RunError> {
        self.mount_table.resolve("cat")
    }

    fn measure(&self, mount_point: &str) -> Result<String, RunError> {
        self.measured
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(mount_point.to_string());

        match self.measurements.get(mount_point) {
            Some(outcome) => outcome.resolve("df"),
            None => MockOutcome::exit(1, format!("df: {mount_point}: No such file or directory"))
                .resolve("df"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_measure_calls_in_order() {
        let runner = MockRunner::typical_host();
        runner.measure("/data").unwrap();
        runner.measure("/").unwrap();
        assert_eq!(runner.measured_paths(), ["/data", "/"]);
    }

    #[test]
    fn unknown_mount_point_fails_like_df() {
        let runner = MockRunner::new();
        let err = runner.measure("/missing").unwrap_err();
        assert!(matches!(err, RunError::Exit { .. }));
        assert!(err.to_string().contains("No such file or directory"));
    }

    #[test]
    fn df_fixture_has_header_and_body() {
        let mut runner = MockRunner::new();
        runner.add_df("/", "/dev/sda1", "ext4", 100, 40, 60);
        let out = runner.measure("/").unwrap();
        let body: Vec<&str> = out.lines().nth(1).unwrap().split_whitespace().collect();
        assert_eq!(body, ["/dev/sda1", "ext4", "100", "40", "60", "40%", "/"]);
    }
}
