use crate::collectors::filesystem::{MountFilter, DEFAULT_IGNORED_FS_TYPES, DEFAULT_IGNORED_MOUNT_POINTS};
use crate::collectors::runner::NsenterRunner;
use crate::error::SampleError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub filters: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Path or name of the nsenter binary
    pub nsenter_path: String,
    /// PID whose mount namespace is entered (1 = host init)
    pub target_pid: u32,
    /// Per-command timeout in seconds. 0 = wait forever.
    pub measure_timeout_sec: u64,
}

/// Regular expressions for mounts that are never measured.
///
/// Example in mountstat.toml:
/// ```toml
/// [filters]
/// ignored_mount_points = "^/(sys|proc|dev|run)($|/)"
/// ignored_fs_types     = "^(sys|proc|auto|tmp)fs$"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub ignored_mount_points: String,
    pub ignored_fs_types:     String,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            nsenter_path:        "nsenter".into(),
            target_pid:          1,
            measure_timeout_sec: 30,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignored_mount_points: DEFAULT_IGNORED_MOUNT_POINTS.into(),
            ignored_fs_types:     DEFAULT_IGNORED_FS_TYPES.into(),
        }
    }
}

impl GeneralConfig {
    pub fn measure_timeout(&self) -> Option<Duration> {
        match self.measure_timeout_sec {
            0    => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn runner(&self) -> NsenterRunner {
        NsenterRunner::new(&self.nsenter_path, self.target_pid, self.measure_timeout())
    }
}

impl FilterConfig {
    pub fn compile(&self) -> Result<MountFilter, SampleError> {
        MountFilter::new(&self.ignored_mount_points, &self.ignored_fs_types)
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    /// Load from the default location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        match try_load() {
            Ok(c)  => c,
            Err(e) => {
                debug!(error = %e, "using default configuration");
                // Write defaults on first run (best-effort)
                let _ = try_write_defaults();
                Config::default()
            }
        }
    }

    /// Load an explicitly named file. Errors are returned, not swallowed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let cfg: Config = toml::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mountstat").join("mountstat.toml"))
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    Config::load_from(&path)
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    write_defaults(&path)
}

fn write_defaults(path: &Path) -> Result<()> {
    // Never clobber a file the user wrote, even a broken one.
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# mountstat configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}
