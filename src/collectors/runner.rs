//! Commands executed inside the host's mount namespace.
//!
//! The collector usually runs in a container, so its own `/proc/mounts` is not
//! the host's view. Everything host-facing goes through `nsenter` targeting
//! PID 1 (or a configured PID) and is captured as text.

use crate::error::RunError;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Source of the host mount table and per-mount usage reports.
pub trait PrivilegedRunner: Send + Sync {
    /// Returns the raw host mount table (`/proc/mounts` format).
    fn read_mount_table(&self) -> Result<String, RunError>;

    /// Returns `df -T -B 1` style output for a single mount point.
    fn measure(&self, mount_point: &str) -> Result<String, RunError>;
}

/// Production runner built on `nsenter -t <pid> -m`.
#[derive(Debug, Clone)]
pub struct NsenterRunner {
    nsenter:    PathBuf,
    target_pid: u32,
    timeout:    Option<Duration>,
}

impl Default for NsenterRunner {
    fn default() -> Self {
        Self {
            nsenter:    PathBuf::from("nsenter"),
            target_pid: 1,
            timeout:    Some(Duration::from_secs(30)),
        }
    }
}

impl NsenterRunner {
    pub fn new(nsenter: impl Into<PathBuf>, target_pid: u32, timeout: Option<Duration>) -> Self {
        Self { nsenter: nsenter.into(), target_pid, timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.nsenter);
        cmd.arg("-t").arg(self.target_pid.to_string()).arg("-m").args(args);
        cmd
    }
}

impl PrivilegedRunner for NsenterRunner {
    fn read_mount_table(&self) -> Result<String, RunError> {
        run_captured(self.command(["cat", "/proc/mounts"]), self.timeout)
    }

    fn measure(&self, mount_point: &str) -> Result<String, RunError> {
        // -B 1 forces byte-exact counts instead of 1K blocks.
        run_captured(self.command(["df", "-T", "-B", "1", "--", mount_point]), self.timeout)
    }
}

/// Run `cmd` to completion and return its stdout.
///
/// The child is always reaped: on timeout it is killed and waited on before
/// returning. A `None` or zero timeout waits indefinitely.
pub(crate) fn run_captured(mut cmd: Command, timeout: Option<Duration>) -> Result<String, RunError> {
    let program = cmd.get_program().to_string_lossy().into_owned();

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| RunError::Spawn { program: program.clone(), source })?;

    // Drain both pipes concurrently so a verbose child never blocks on write.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout.filter(|t| !t.is_zero()) {
        Some(limit) => wait_with_deadline(&mut child, limit, &program)?,
        None => child
            .wait()
            .map_err(|source| RunError::Wait { program: program.clone(), source })?,
    };

    let out = stdout.join().unwrap_or_default();
    let err = stderr.join().unwrap_or_default();

    if !status.success() {
        return Err(RunError::Exit {
            program,
            status: status.to_string(),
            stderr: String::from_utf8_lossy(&err).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn wait_with_deadline(child: &mut Child, limit: Duration, program: &str) -> Result<ExitStatus, RunError> {
    let deadline = Instant::now() + limit;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(source) => {
                reap(child);
                return Err(RunError::Wait { program: program.to_string(), source });
            }
        }

        let now = Instant::now();
        if now >= deadline {
            reap(child);
            return Err(RunError::TimedOut { program: program.to_string(), timeout: limit });
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn reap(child: &mut Child) {
    // kill() fails if the child already exited; wait() still collects it.
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut p) = pipe {
            let _ = p.read_to_end(&mut buf);
        }
        buf
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn captures_stdout_on_success() {
        let out = run_captured(sh("printf 'a b c\\n'"), Some(Duration::from_secs(5))).unwrap();
        assert_eq!(out, "a b c\n");
    }

    #[test]
    fn nonzero_exit_is_an_error_with_stderr() {
        let err = run_captured(sh("echo boom >&2; exit 3"), None).unwrap_err();
        match err {
            RunError::Exit { program, stderr, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let cmd = Command::new("/nonexistent/mountstat-test-binary");
        assert!(matches!(run_captured(cmd, None), Err(RunError::Spawn { .. })));
    }

    #[test]
    fn hung_child_is_killed_after_timeout() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let started = Instant::now();
        let err = run_captured(cmd, Some(Duration::from_millis(200))).unwrap_err();
        assert!(matches!(err, RunError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn zero_timeout_waits_for_completion() {
        let out = run_captured(sh("sleep 0.1; echo done"), Some(Duration::ZERO)).unwrap();
        assert_eq!(out.trim(), "done");
    }

    #[test]
    fn nsenter_command_line() {
        let runner = NsenterRunner::new("/usr/bin/nsenter", 1, None);
        let cmd = runner.command(["df", "-T", "-B", "1", "--", "/data"]);
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), std::ffi::OsStr::new("/usr/bin/nsenter"));
        assert_eq!(args, ["-t", "1", "-m", "df", "-T", "-B", "1", "--", "/data"]);
    }
}
