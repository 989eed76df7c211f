mod relative;

pub use relative::relative_time;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{CommandError, ProbeError};
use crate::git::{
    GitRunner, RawCommit, ahead_behind, current_branch, last_commit, remote_url,
    uncommitted_count, upstream_ref,
};
use crate::issues::IssueTracker;
use crate::remote::canonical_identity;
use crate::system::Clock;
use crate::types::{LastCommit, RepoStatus};

/// A read-only query whose failure a probe records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Branch,
    Uncommitted,
    Upstream,
    AheadBehind,
    LastCommit,
    Remote,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Uncommitted => "uncommitted",
            Self::Upstream => "upstream",
            Self::AheadBehind => "ahead/behind",
            Self::LastCommit => "last commit",
            Self::Remote => "remote",
        }
    }

    /// Whether a pull decision reads this field.
    pub(crate) fn gates_pull(self) -> bool {
        matches!(
            self,
            Self::Branch | Self::Uncommitted | Self::Upstream | Self::AheadBehind
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Issues {
    Lookup,
    Skip,
}

/// A probed record plus the queries that failed while building it.
#[derive(Debug)]
pub(crate) struct ProbeReport {
    pub(crate) status: RepoStatus,
    pub(crate) failed: Vec<(Field, String)>,
}

impl ProbeReport {
    /// Failures among the fields a pull decision reads, `None` when there
    /// are none.
    pub(crate) fn pull_blocker(&self) -> Option<String> {
        let blocking: Vec<&str> = self
            .failed
            .iter()
            .filter(|(field, _)| field.gates_pull())
            .map(|(_, message)| message.as_str())
            .collect();
        if blocking.is_empty() {
            None
        } else {
            Some(blocking.join("; "))
        }
    }
}

/// Runs the read-only query battery against one working copy.
///
/// Every query is independent: a failed or timed-out query leaves its fields
/// at their defaults and is named in [`RepoStatus::error`], while the others
/// still run.
pub struct GitProbe {
    git: Arc<dyn GitRunner>,
    issues: Arc<dyn IssueTracker>,
    clock: Arc<dyn Clock>,
    read_timeout: Duration,
    hosts: Vec<String>,
}

impl GitProbe {
    #[must_use]
    pub fn new(
        git: Arc<dyn GitRunner>,
        issues: Arc<dyn IssueTracker>,
        clock: Arc<dyn Clock>,
        read_timeout: Duration,
        hosts: Vec<String>,
    ) -> Self {
        Self {
            git,
            issues,
            clock,
            read_timeout,
            hosts,
        }
    }

    #[must_use]
    pub fn probe(&self, path: &Path) -> RepoStatus {
        self.inspect(path, Issues::Lookup).status
    }

    pub(crate) fn inspect(&self, path: &Path, issues: Issues) -> ProbeReport {
        let now = self.clock.now_utc();
        let mut status = RepoStatus::new(repo_name(path), path.to_path_buf(), now);
        let mut failures = Failures::default();
        let git = self.git.as_ref();
        let timeout = self.read_timeout;

        match current_branch(path, git, timeout) {
            Ok(branch) => status.branch = branch,
            Err(ProbeError::Command(err @ CommandError::Spawn { .. })) => {
                // No git binary: nothing else can succeed either.
                let message = format!("git unavailable: {err}");
                status.error = Some(message.clone());
                return ProbeReport {
                    status,
                    failed: vec![(Field::Branch, message)],
                };
            }
            Err(err) => failures.record(Field::Branch, &err),
        }

        match uncommitted_count(path, git, timeout) {
            Ok(count) => status.uncommitted = count,
            Err(err) => failures.record(Field::Uncommitted, &err),
        }

        match upstream_ref(path, git, timeout) {
            Ok(Some(upstream)) => {
                match ahead_behind(path, git, &upstream, timeout) {
                    Ok((ahead, behind)) => {
                        status.ahead = ahead;
                        status.behind = behind;
                    }
                    Err(err) => failures.record(Field::AheadBehind, &err),
                }
                status.upstream = Some(upstream);
            }
            Ok(None) => {}
            Err(err) => failures.record(Field::Upstream, &err),
        }

        match last_commit(path, git, timeout) {
            Ok(Some(raw)) => match to_last_commit(raw, now) {
                Ok(commit) => status.last_commit = Some(commit),
                Err(err) => failures.record(Field::LastCommit, &err),
            },
            Ok(None) => {}
            Err(err) => failures.record(Field::LastCommit, &err),
        }

        match remote_url(path, git, timeout) {
            Ok(url) => {
                status.remote_identity = url
                    .as_deref()
                    .and_then(|u| canonical_identity(u, &self.hosts));
                status.remote_url = url;
            }
            Err(err) => failures.record(Field::Remote, &err),
        }

        if issues == Issues::Lookup
            && let Some(identity) = &status.remote_identity
        {
            status.open_issues = self.issues.open_issues(identity);
        }

        status.error = failures.message();
        if let Some(error) = &status.error {
            log::debug!("{}: partial probe: {error}", status.name);
        }
        ProbeReport {
            status,
            failed: failures.0,
        }
    }
}

fn to_last_commit(raw: RawCommit, now: DateTime<Utc>) -> Result<LastCommit, ProbeError> {
    let timestamp = DateTime::<Utc>::from_timestamp(raw.timestamp, 0)
        .ok_or_else(|| ProbeError::Parse(raw.timestamp.to_string()))?;
    let age = now.signed_duration_since(timestamp).num_seconds();
    Ok(LastCommit {
        hash: raw.hash,
        message: raw.message,
        author: raw.author,
        timestamp,
        relative: relative_time(age),
    })
}

/// Base name of `path`, falling back to the whole path.
pub(crate) fn repo_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Default)]
struct Failures(Vec<(Field, String)>);

impl Failures {
    fn record(&mut self, field: Field, err: &ProbeError) {
        let kind = if err.is_timeout() { "timeout" } else { "failed" };
        self.0.push((field, format!("{} {kind}: {err}", field.label())));
    }

    fn message(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            let parts: Vec<&str> = self.0.iter().map(|(_, m)| m.as_str()).collect();
            Some(parts.join("; "))
        }
    }
}
