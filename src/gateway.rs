//! Fetch and pull behind a confirmation gate and a per-repository lock.
//!
//! Each request walks `Requested -> Precheck -> {NeedsConfirmation | Executing}
//! -> {Succeeded | Failed}`. A pull over a dirty working tree stops at
//! `NeedsConfirmation` until it is resubmitted with `confirmed` set.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::StatusCache;
use crate::error::{CommandError, MutationError};
use crate::git::{self, GitRunner};
use crate::locks::{RepoLocks, acquire};
use crate::probe::{GitProbe, Issues};
use crate::process::CommandOutput;
use crate::system::FsOps;
use crate::types::{
    MutationOp, MutationRequest, MutationResult, PrecheckDetails, RepoStatus, Timeouts,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Requested,
    Precheck,
    NeedsConfirmation,
    Executing,
    Succeeded,
    Failed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Requested => "requested",
            Self::Precheck => "precheck",
            Self::NeedsConfirmation => "needs-confirmation",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Tracks one request through the state machine, for the log.
struct Transitions<'a> {
    repo: &'a str,
    op: MutationOp,
    state: State,
}

impl<'a> Transitions<'a> {
    fn start(repo: &'a str, op: MutationOp) -> Self {
        Self {
            repo,
            op,
            state: State::Requested,
        }
    }

    fn to(&mut self, next: State) {
        log::debug!("{} {}: {} -> {next}", self.op, self.repo, self.state);
        self.state = next;
    }

    fn finish(mut self, result: Result<MutationResult, MutationError>) -> MutationResult {
        match result {
            Ok(result) => {
                let next = match &result {
                    MutationResult::Succeeded { .. } => State::Succeeded,
                    MutationResult::Failed { .. } => State::Failed,
                    MutationResult::NeedsConfirmation(_) => State::NeedsConfirmation,
                };
                if self.state != next {
                    self.to(next);
                }
                log::info!("{} {}: {next}", self.op, self.repo);
                result
            }
            Err(err) => {
                self.to(State::Failed);
                log::warn!("{} {}: {err}", self.op, self.repo);
                MutationResult::Failed {
                    diagnostic: err.to_string(),
                }
            }
        }
    }
}

pub struct MutationGateway {
    root: PathBuf,
    git: Arc<dyn GitRunner>,
    fs: Arc<dyn FsOps>,
    probe: Arc<GitProbe>,
    cache: Arc<StatusCache>,
    locks: Arc<RepoLocks>,
    timeouts: Timeouts,
}

impl MutationGateway {
    #[must_use]
    pub fn new(
        root: PathBuf,
        git: Arc<dyn GitRunner>,
        fs: Arc<dyn FsOps>,
        probe: Arc<GitProbe>,
        cache: Arc<StatusCache>,
        locks: Arc<RepoLocks>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            root,
            git,
            fs,
            probe,
            cache,
            locks,
            timeouts,
        }
    }

    pub fn execute(&self, request: &MutationRequest) -> MutationResult {
        match request.op {
            MutationOp::Fetch => self.fetch(&request.repo),
            MutationOp::Pull => self.pull(&request.repo, request.confirmed),
        }
    }

    /// Update remote-tracking refs. Never asks for confirmation.
    pub fn fetch(&self, repo: &str) -> MutationResult {
        let mut transitions = Transitions::start(repo, MutationOp::Fetch);
        let result = self.resolve(repo).and_then(|path| {
            let lock = self.locks.lock_for(repo);
            let _guard = acquire(&lock);
            transitions.to(State::Precheck);
            transitions.to(State::Executing);
            let out = git::fetch(&path, self.git.as_ref(), self.timeouts.fetch);
            check(MutationOp::Fetch, out)?;
            let status = self.refresh(&path);
            Ok(MutationResult::Succeeded {
                status: Box::new(status),
                message: None,
            })
        });
        transitions.finish(result)
    }

    /// Bring the current branch up to date with its upstream.
    ///
    /// A dirty working tree needs `confirmed`; without it nothing is run and
    /// nothing is written.
    pub fn pull(&self, repo: &str, confirmed: bool) -> MutationResult {
        let mut transitions = Transitions::start(repo, MutationOp::Pull);
        let result = self.resolve(repo).and_then(|path| {
            let lock = self.locks.lock_for(repo);
            let _guard = acquire(&lock);
            transitions.to(State::Precheck);
            let report = self.probe.inspect(&path, Issues::Skip);
            if let Some(blocker) = report.pull_blocker() {
                return Err(MutationError::Precheck(blocker));
            }
            let current = self.with_cached_issues(report.status);
            if current.behind == 0 {
                self.cache.put(current.clone());
                return Ok(MutationResult::Succeeded {
                    status: Box::new(current),
                    message: Some("Already up to date".to_string()),
                });
            }
            if current.uncommitted > 0 && !confirmed {
                return Ok(MutationResult::NeedsConfirmation(precheck_details(&current)));
            }

            transitions.to(State::Executing);
            let out = git::pull(&path, self.git.as_ref(), self.timeouts.pull);
            let out = check(MutationOp::Pull, out)?;
            let status = self.refresh(&path);
            Ok(MutationResult::Succeeded {
                status: Box::new(status),
                message: git::pull_summary(&out.stdout),
            })
        });
        transitions.finish(result)
    }

    fn resolve(&self, repo: &str) -> Result<PathBuf, MutationError> {
        if !is_valid_repo_name(repo) {
            return Err(MutationError::InvalidName(repo.to_string()));
        }
        let path = self.root.join(repo);
        if !path.is_dir() || !self.fs.is_repo(&path) {
            return Err(MutationError::NotFound(repo.to_string()));
        }
        Ok(path)
    }

    /// Re-probe after a successful command and publish the fresh record.
    /// Callers hold the repository lock.
    fn refresh(&self, path: &Path) -> RepoStatus {
        let status = self.with_cached_issues(self.probe.inspect(path, Issues::Skip).status);
        self.cache.put(status.clone());
        status
    }

    /// Mutations never query the issue tracker; the last scanned count stays
    /// valid while the remote identity is unchanged.
    fn with_cached_issues(&self, mut status: RepoStatus) -> RepoStatus {
        if let Some(previous) = self.cache.entry(&status.name)
            && previous.remote_identity == status.remote_identity
        {
            status.open_issues = previous.open_issues;
        }
        status
    }
}

fn check(
    op: MutationOp,
    out: Result<CommandOutput, CommandError>,
) -> Result<CommandOutput, MutationError> {
    match out {
        Ok(out) if out.success() => Ok(out),
        Ok(out) => {
            let stderr = out.stderr.trim();
            let diagnostic = if stderr.is_empty() {
                format!("{op} failed")
            } else {
                stderr.to_string()
            };
            Err(MutationError::CommandFailed { diagnostic })
        }
        Err(CommandError::TimedOut { timeout }) => Err(MutationError::TimedOut { op, timeout }),
        Err(source) => Err(MutationError::Spawn { op, source }),
    }
}

fn precheck_details(status: &RepoStatus) -> PrecheckDetails {
    PrecheckDetails {
        branch: status.branch.clone(),
        uncommitted: status.uncommitted,
        ahead: status.ahead,
        behind: status.behind,
    }
}

/// A plain directory name: ASCII alphanumerics, `_`, `-` and `.`, no `..`,
/// not hidden.
#[must_use]
pub fn is_valid_repo_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
