use super::mounts::list_mounts;
use super::runner::PrivilegedRunner;
use crate::error::SampleError;
use crate::models::filesystem::StatRecord;
use crate::models::mount::MountRecord;
use crate::observer::ScanObserver;
use regex::Regex;

/// Mount points with no useful capacity: /sys, /proc, /dev and anything below.
pub const DEFAULT_IGNORED_MOUNT_POINTS: &str = "^/(sys|proc|dev)($|/)";

/// Pseudo filesystem types: sysfs, procfs, autofs.
pub const DEFAULT_IGNORED_FS_TYPES: &str = "^(sys|proc|auto)fs$";

/// Why a mount was left out of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    MountPoint,
    FsType,
}

impl Exclusion {
    pub fn label(self) -> &'static str {
        match self {
            Exclusion::MountPoint => "ignored mount point",
            Exclusion::FsType     => "ignored fs type",
        }
    }
}

/// Compiled exclusion patterns. Patterns are searched, so they anchor only
/// where they say so.
#[derive(Debug, Clone)]
pub struct MountFilter {
    mount_points: Regex,
    fs_types:     Regex,
}

impl Default for MountFilter {
    fn default() -> Self {
        Self {
            mount_points: Regex::new(DEFAULT_IGNORED_MOUNT_POINTS).expect("default mount point pattern"),
            fs_types:     Regex::new(DEFAULT_IGNORED_FS_TYPES).expect("default fs type pattern"),
        }
    }
}

impl MountFilter {
    pub fn new(mount_points: &str, fs_types: &str) -> Result<Self, SampleError> {
        Ok(Self {
            mount_points: compile("ignored mount point", mount_points)?,
            fs_types:     compile("ignored fs type", fs_types)?,
        })
    }

    pub fn exclusion(&self, mount: &MountRecord) -> Option<Exclusion> {
        if self.mount_points.is_match(&mount.mount_point) {
            Some(Exclusion::MountPoint)
        } else if self.fs_types.is_match(&mount.fs_type) {
            Some(Exclusion::FsType)
        } else {
            None
        }
    }

    pub fn mount_point_pattern(&self) -> &str {
        self.mount_points.as_str()
    }

    pub fn fs_type_pattern(&self) -> &str {
        self.fs_types.as_str()
    }
}

fn compile(which: &'static str, pattern: &str) -> Result<Regex, SampleError> {
    Regex::new(pattern).map_err(|source| SampleError::InvalidPattern {
        which,
        pattern: pattern.to_string(),
        source,
    })
}

/// Column of the usage report a value was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageField {
    Size,
    Avail,
    Free,
}

impl UsageField {
    /// Token index on the report's data line.
    pub const fn index(self) -> usize {
        match self {
            UsageField::Size  => 2,
            UsageField::Avail => 3,
            UsageField::Free  => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UsageField::Size  => "size",
            UsageField::Avail => "avail",
            UsageField::Free  => "free",
        }
    }
}

/// Result of reading one usage report.
#[derive(Debug, Clone, PartialEq)]
pub enum UsageParse {
    /// Fewer than five tokens on the data line (or no data line).
    Insufficient,
    Invalid { field: UsageField, token: String },
    Usage { size: f64, avail: f64, free: f64 },
}

/// Parse a usage report: a header line, then a data line whose tokens 2, 3
/// and 4 are size, avail and free.
///
/// With `df -T` token 3 is the "Used" column; the mapping is kept as-is so
/// values stay comparable with existing dashboards.
pub fn parse_usage(output: &str) -> UsageParse {
    let Some(line) = output.lines().nth(1) else {
        return UsageParse::Insufficient;
    };
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return UsageParse::Insufficient;
    }

    let mut values = [0.0_f64; 3];
    for (slot, field) in values.iter_mut().zip([UsageField::Size, UsageField::Avail, UsageField::Free]) {
        let token = fields[field.index()];
        match token.parse::<f64>() {
            Ok(v)  => *slot = v,
            Err(_) => return UsageParse::Invalid { field, token: token.to_string() },
        }
    }

    let [size, avail, free] = values;
    UsageParse::Usage { size, avail, free }
}

/// Measure every mount not excluded by `filter`, in order.
///
/// One record per surviving mount; a failed measurement yields an error
/// record instead of aborting. Reports with too few fields yield nothing.
pub fn sample<R, O>(runner: &R, filter: &MountFilter, observer: &O, mounts: Vec<MountRecord>) -> Vec<StatRecord>
where
    R: PrivilegedRunner + ?Sized,
    O: ScanObserver + ?Sized,
{
    let mut out = Vec::with_capacity(mounts.len());

    for mount in mounts {
        if let Some(exclusion) = filter.exclusion(&mount) {
            observer.on_excluded(&mount, exclusion);
            continue;
        }

        let output = match runner.measure(&mount.mount_point) {
            Ok(o) => o,
            Err(e) => {
                observer.on_measure_error(&mount, &e);
                let stat = StatRecord::failed(mount);
                observer.on_sampled(&stat);
                out.push(stat);
                continue;
            }
        };

        let stat = match parse_usage(&output) {
            UsageParse::Usage { size, avail, free } => StatRecord::measured(mount, size, avail, free),
            UsageParse::Invalid { field, token } => {
                observer.on_parse_error(&mount, field, &token);
                StatRecord::failed(mount)
            }
            UsageParse::Insufficient => {
                observer.on_malformed(&mount, &output);
                continue;
            }
        };
        observer.on_sampled(&stat);
        out.push(stat);
    }

    out
}

/// Enumerate host mounts and sample them. Fails only if enumeration fails.
pub fn get_stats<R, O>(runner: &R, filter: &MountFilter, observer: &O) -> Result<Vec<StatRecord>, SampleError>
where
    R: PrivilegedRunner + ?Sized,
    O: ScanObserver + ?Sized,
{
    let mounts = list_mounts(runner)?;
    Ok(sample(runner, filter, observer, mounts))
}

/// Runner, filter and observer bundled for repeated scans.
#[derive(Debug)]
pub struct FilesystemCollector<R, O> {
    runner:   R,
    filter:   MountFilter,
    observer: O,
}

impl<R: PrivilegedRunner, O: ScanObserver> FilesystemCollector<R, O> {
    pub fn new(runner: R, filter: MountFilter, observer: O) -> Self {
        Self { runner, filter, observer }
    }

    pub fn get_stats(&self) -> Result<Vec<StatRecord>, SampleError> {
        get_stats(&self.runner, &self.filter, &self.observer)
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn filter(&self) -> &MountFilter {
        &self.filter
    }
}
