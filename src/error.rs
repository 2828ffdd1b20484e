use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure of one privileged command invocation.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed ({status}): {stderr}")]
    Exit {
        program: String,
        status:  String,
        stderr:  String,
    },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("failed waiting on {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Scan-level failure. Per-mount problems never show up here.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("could not read host mount table: {0}")]
    Enumeration(#[source] RunError),

    #[error("invalid {which} pattern {pattern:?}: {source}")]
    InvalidPattern {
        which:   &'static str,
        pattern: String,
        #[source]
        source:  regex::Error,
    },
}
