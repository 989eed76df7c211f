use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Branch label used when HEAD does not point at a branch.
pub const DETACHED_BRANCH: &str = "detached";
/// Branch label used when the branch query itself failed.
pub const UNKNOWN_BRANCH: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastCommit {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    /// Age label relative to the probe time, e.g. `3h ago`.
    pub relative: String,
}

/// Everything known about one working copy at `scanned_at`.
///
/// A record with `error` set is still complete: the fields whose query
/// failed hold their defaults and must be read as "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStatus {
    pub name: String,
    pub path: PathBuf,
    pub branch: String,
    pub uncommitted: u64,
    pub ahead: u64,
    pub behind: u64,
    pub upstream: Option<String>,
    pub last_commit: Option<LastCommit>,
    pub remote_url: Option<String>,
    pub remote_identity: Option<String>,
    /// `None` when the count is unknown.
    pub open_issues: Option<u64>,
    pub error: Option<String>,
    pub scanned_at: DateTime<Utc>,
}

impl RepoStatus {
    #[must_use]
    pub fn new(name: String, path: PathBuf, scanned_at: DateTime<Utc>) -> Self {
        Self {
            name,
            path,
            branch: UNKNOWN_BRANCH.to_string(),
            uncommitted: 0,
            ahead: 0,
            behind: 0,
            upstream: None,
            last_commit: None,
            remote_url: None,
            remote_identity: None,
            open_issues: None,
            error: None,
            scanned_at,
        }
    }

    /// A record carrying only identity and an error.
    #[must_use]
    pub fn failed(
        name: String,
        path: PathBuf,
        scanned_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(name, path, scanned_at)
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.uncommitted == 0 && self.ahead == 0 && self.behind == 0
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.uncommitted > 0
    }

    #[must_use]
    pub fn has_upstream(&self) -> bool {
        self.upstream.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub taken_at: Option<DateTime<Utc>>,
    pub repos: Vec<RepoStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Name,
    Recent,
}

impl SortOrder {
    /// Total order over records; independent of the order they were produced in.
    #[must_use]
    pub fn compare(self, a: &RepoStatus, b: &RepoStatus) -> Ordering {
        let by_name = || {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        };
        match self {
            Self::Name => by_name(),
            Self::Recent => {
                let ta = a.last_commit.as_ref().map(|c| c.timestamp);
                let tb = b.last_commit.as_ref().map(|c| c.timestamp);
                // Newest first, repos without commits last.
                tb.cmp(&ta).then_with(by_name)
            }
        }
    }

    pub fn sort(self, repos: &mut [RepoStatus]) {
        repos.sort_by(|a, b| self.compare(a, b));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationOp {
    Fetch,
    Pull,
}

impl fmt::Display for MutationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("fetch"),
            Self::Pull => f.write_str("pull"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub repo: String,
    pub op: MutationOp,
    #[serde(default)]
    pub confirmed: bool,
}

impl MutationRequest {
    #[must_use]
    pub fn fetch(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            op: MutationOp::Fetch,
            confirmed: false,
        }
    }

    #[must_use]
    pub fn pull(repo: impl Into<String>, confirmed: bool) -> Self {
        Self {
            repo: repo.into(),
            op: MutationOp::Pull,
            confirmed,
        }
    }
}

/// What the caller needs to decide whether to resubmit a pull with `confirmed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecheckDetails {
    pub branch: String,
    pub uncommitted: u64,
    pub ahead: u64,
    pub behind: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationResult {
    Succeeded {
        status: Box<RepoStatus>,
        message: Option<String>,
    },
    Failed {
        diagnostic: String,
    },
    NeedsConfirmation(PrecheckDetails),
}

impl MutationResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub read: Duration,
    pub issues: Duration,
    pub fetch: Duration,
    pub pull: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(10),
            issues: Duration::from_secs(15),
            fetch: Duration::from_secs(60),
            pull: Duration::from_secs(120),
        }
    }
}

/// Resolved runtime settings, after config file and CLI overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub concurrency: usize,
    pub sort: SortOrder,
    pub timeouts: Timeouts,
    pub hosts: Vec<String>,
    pub show_progress: bool,
}

pub const DEFAULT_CONCURRENCY: usize = 10;

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("~/git"),
            concurrency: DEFAULT_CONCURRENCY,
            sort: SortOrder::Name,
            timeouts: Timeouts::default(),
            hosts: vec!["github.com".to_string()],
            show_progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    fn repo(name: &str, commit_at: Option<i64>) -> RepoStatus {
        let mut status = RepoStatus::new(name.to_string(), PathBuf::from(name), at(0));
        status.last_commit = commit_at.map(|secs| LastCommit {
            hash: "abc".to_string(),
            message: "msg".to_string(),
            author: "dev".to_string(),
            timestamp: at(secs),
            relative: "just now".to_string(),
        });
        status
    }

    #[test]
    fn clean_requires_no_changes_and_full_sync() {
        let mut status = repo("a", None);
        assert!(status.is_clean());
        status.behind = 1;
        assert!(!status.is_clean());
        status.behind = 0;
        status.uncommitted = 2;
        assert!(!status.is_clean());
        assert!(status.is_dirty());
    }

    #[test]
    fn name_order_ignores_case() {
        let mut repos = vec![repo("beta", None), repo("Alpha", None), repo("alpha", None)];
        SortOrder::Name.sort(&mut repos);
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "alpha", "beta"]);
    }

    #[test]
    fn recent_order_puts_newest_first_and_empty_last() {
        let mut repos = vec![
            repo("empty", None),
            repo("old", Some(100)),
            repo("new", Some(500)),
            repo("also-new", Some(500)),
        ];
        SortOrder::Recent.sort(&mut repos);
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["also-new", "new", "old", "empty"]);
    }

    #[test]
    fn mutation_result_serializes_with_outcome_tag() {
        let result = MutationResult::NeedsConfirmation(PrecheckDetails {
            branch: "main".to_string(),
            uncommitted: 3,
            ahead: 0,
            behind: 2,
        });
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["outcome"], "needs_confirmation");
        assert_eq!(json["uncommitted"], 3);
    }
}
