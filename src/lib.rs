//! Per-mount filesystem usage sampling from the host mount namespace.
//!
//! A scan reads the host mount table, drops pseudo filesystems by pattern,
//! runs `df` against every remaining mount point and turns each report into
//! a [`StatRecord`]. A mount whose measurement fails still produces a record,
//! flagged with `device_error`; only a failed mount table read fails the scan.
//!
//! ```
//! use mountstat::{get_stats, MockRunner, MountFilter, NoopObserver};
//!
//! let runner = MockRunner::typical_host();
//! let stats = get_stats(&runner, &MountFilter::default(), &NoopObserver).unwrap();
//! assert!(stats.iter().all(|s| !s.mount.mount_point.starts_with("/proc")));
//! ```

pub mod collectors;
pub mod config;
pub mod error;
pub mod models;
pub mod observer;
pub mod util;

pub use collectors::filesystem::{get_stats, sample, FilesystemCollector, MountFilter};
pub use collectors::mock::{MockOutcome, MockRunner};
pub use collectors::mounts::list_mounts;
pub use collectors::runner::{NsenterRunner, PrivilegedRunner};
pub use error::{RunError, SampleError};
pub use models::filesystem::StatRecord;
pub use models::mount::MountRecord;
pub use observer::{NoopObserver, ScanObserver, TracingObserver};
