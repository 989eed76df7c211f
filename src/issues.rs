use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use serde_json::Value;

use crate::process::run_with_timeout;

/// Source of open-issue counts for a hosted `owner/repo`.
///
/// Implementations never fail: anything that goes wrong is `None` (unknown).
pub trait IssueTracker: Send + Sync {
    fn open_issues(&self, owner_repo: &str) -> Option<u64>;
}

/// Queries the GitHub CLI (`gh issue list`).
pub struct GhIssueTracker {
    binary: PathBuf,
    timeout: Duration,
    limit: u32,
}

pub const DEFAULT_ISSUE_LIMIT: u32 = 1000;

impl GhIssueTracker {
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration, limit: u32) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            limit,
        }
    }
}

impl Default for GhIssueTracker {
    fn default() -> Self {
        Self::new("gh", Duration::from_secs(15), DEFAULT_ISSUE_LIMIT)
    }
}

impl IssueTracker for GhIssueTracker {
    fn open_issues(&self, owner_repo: &str) -> Option<u64> {
        let mut command = Command::new(&self.binary);
        command
            .args(["issue", "list", "--repo", owner_repo, "--state", "open"])
            .args(["--json", "number", "--limit"])
            .arg(self.limit.to_string());
        let out = match run_with_timeout(command, self.timeout) {
            Ok(out) => out,
            Err(err) => {
                log::debug!("issue lookup for {owner_repo} skipped: {err}");
                return None;
            }
        };
        if !out.success() {
            log::debug!(
                "issue lookup for {owner_repo} failed: {}",
                out.stderr.trim()
            );
            return None;
        }
        count_issues(&out.stdout)
    }
}

fn count_issues(stdout: &str) -> Option<u64> {
    match serde_json::from_str::<Value>(stdout) {
        Ok(Value::Array(items)) => u64::try_from(items.len()).ok(),
        Ok(other) => {
            log::debug!("unexpected issue list payload: {other}");
            None
        }
        Err(err) => {
            log::debug!("malformed issue list payload: {err}");
            None
        }
    }
}

/// Tracker used when issue lookups are turned off.
pub struct DisabledIssueTracker;

impl IssueTracker for DisabledIssueTracker {
    fn open_issues(&self, _owner_repo: &str) -> Option<u64> {
        None
    }
}
