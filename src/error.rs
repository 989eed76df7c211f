use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::MutationOp;

/// Failure to run a child process to completion.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("failed waiting on {program}: {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },
    #[error("timed out after {}s", timeout.as_secs())]
    TimedOut { timeout: Duration },
}

impl CommandError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("scan root {} does not exist", .0.display())]
    RootMissing(PathBuf),
    #[error("scan root {} could not be read: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        source: walkdir::Error,
    },
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("invalid repository name '{0}'")]
    InvalidName(String),
    #[error("repository '{0}' not found")]
    NotFound(String),
    #[error("precheck failed: {0}")]
    Precheck(String),
    #[error("{diagnostic}")]
    CommandFailed { diagnostic: String },
    #[error("{op} timed out after {}s", timeout.as_secs())]
    TimedOut { op: MutationOp, timeout: Duration },
    #[error("{op} could not run: {source}")]
    Spawn {
        op: MutationOp,
        source: CommandError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Failure of one read-only query inside a probe. Only the fields that query
/// feeds are affected.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("exited with {code}: {stderr}")]
    Exit { code: String, stderr: String },
    #[error("unexpected output '{0}'")]
    Parse(String),
}

impl ProbeError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Command(err) if err.is_timeout())
    }
}
