use anyhow::{Context, Result};
use clap::Parser;
use mountstat::config::Config;
use mountstat::util::report;
use mountstat::{FilesystemCollector, TracingObserver};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mountstat", about = "Per-mount filesystem usage of the host mount namespace", version)]
struct Cli {
    /// Print a one-shot JSON snapshot instead of a table
    #[arg(long)]
    json: bool,

    /// Print config file path and effective values, then exit
    #[arg(long)]
    print_config: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Regex of mount points to skip
    #[arg(long, value_name = "REGEX")]
    ignored_mount_points: Option<String>,

    /// Regex of filesystem types to skip
    #[arg(long, value_name = "REGEX")]
    ignored_fs_types: Option<String>,

    /// Per-command timeout in seconds (0 = none)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// PID whose mount namespace is entered
    #[arg(long)]
    target_pid: Option<u32>,

    /// Path to the nsenter binary
    #[arg(long, value_name = "PATH")]
    nsenter: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply(&self, cfg: &mut Config) {
        if let Some(p) = &self.ignored_mount_points { cfg.filters.ignored_mount_points = p.clone(); }
        if let Some(p) = &self.ignored_fs_types     { cfg.filters.ignored_fs_types = p.clone(); }
        if let Some(t) = self.timeout               { cfg.general.measure_timeout_sec = t; }
        if let Some(pid) = self.target_pid          { cfg.general.target_pid = pid; }
        if let Some(n) = &self.nsenter              { cfg.general.nsenter_path = n.clone(); }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut cfg = match &cli.config_file {
        Some(path) => Config::load_from(path)?,
        None       => Config::load(),
    };
    cli.apply(&mut cfg);

    if cli.print_config {
        return run_print_config(&cfg, cli.config_file.clone());
    }

    let filter = cfg.filters.compile()?;
    let collector = FilesystemCollector::new(cfg.general.runner(), filter, TracingObserver);

    let stats = collector.get_stats().context("filesystem scan failed")?;
    let errors = stats.iter().filter(|s| s.device_error).count();
    info!(filesystems = stats.len(), errors, "scan complete");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report::snapshot(&stats))?);
    } else {
        print!("{}", report::generate(&stats));
    }
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_print_config(cfg: &Config, explicit: Option<PathBuf>) -> Result<()> {
    let path = explicit
        .or_else(Config::config_path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    let timeout = match cfg.general.measure_timeout() {
        Some(t) => format!("{}s", t.as_secs()),
        None    => "none".to_string(),
    };
    println!("Config: {}", path);
    println!();
    println!("[general]");
    println!("  nsenter_path         = {}", cfg.general.nsenter_path);
    println!("  target_pid           = {}", cfg.general.target_pid);
    println!("  measure_timeout_sec  = {} ({})", cfg.general.measure_timeout_sec, timeout);
    println!();
    println!("[filters]");
    println!("  ignored_mount_points = {}", cfg.filters.ignored_mount_points);
    println!("  ignored_fs_types     = {}", cfg.filters.ignored_fs_types);
    Ok(())
}
