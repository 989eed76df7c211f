use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

pub trait FsOps: Send + Sync {
    /// Whether `dir` carries a `.git` marker (a directory, or a file for worktrees).
    fn is_repo(&self, dir: &Path) -> bool;
    fn expand_tilde(&self, p: &Path) -> PathBuf;
}

pub struct DefaultFsOps;

impl FsOps for DefaultFsOps {
    fn is_repo(&self, dir: &Path) -> bool {
        dir.join(".git").exists()
    }

    fn expand_tilde(&self, p: &Path) -> PathBuf {
        if let Some(home) = std::env::var_os("HOME")
            && let Ok(rest) = p.strip_prefix("~")
        {
            return PathBuf::from(home).join(rest);
        }
        p.to_path_buf()
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().into()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
