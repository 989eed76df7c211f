//! Fakes for the git, issue-tracker and clock seams.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::CommandError;
use crate::git::GitRunner;
use crate::issues::IssueTracker;
use crate::process::CommandOutput;
use crate::system::Clock;

pub(crate) const NOW_SECS: u64 = 1_700_000_000;

pub(crate) struct FixedClock(pub(crate) SystemTime);

impl FixedClock {
    pub(crate) fn at_now() -> Self {
        Self(UNIX_EPOCH + Duration::from_secs(NOW_SECS))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

type Handler = dyn Fn(&Path, &[&str]) -> Result<CommandOutput, CommandError> + Send + Sync;

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub(crate) repo: PathBuf,
    pub(crate) args: Vec<String>,
}

/// Records every invocation and answers through `handler`.
pub(crate) struct FakeGit {
    handler: Box<Handler>,
    calls: Mutex<Vec<Call>>,
}

impl FakeGit {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&Path, &[&str]) -> Result<CommandOutput, CommandError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every repository answers like `script`.
    pub(crate) fn uniform(script: RepoScript) -> Self {
        Self::new(move |_, args| script.respond(args))
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn count(&self, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.args.first().is_some_and(|a| a == subcommand))
            .count()
    }
}

impl GitRunner for FakeGit {
    fn run_git(
        &self,
        repo: &Path,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        self.calls.lock().expect("calls lock").push(Call {
            repo: repo.to_path_buf(),
            args: args.iter().map(ToString::to_string).collect(),
        });
        (self.handler)(repo, args)
    }
}

/// Canned answers for the probe's query battery.
#[derive(Debug, Clone)]
pub(crate) struct RepoScript {
    pub(crate) branch: Option<String>,
    pub(crate) uncommitted: u64,
    pub(crate) upstream: Option<String>,
    pub(crate) ahead: u64,
    pub(crate) behind: u64,
    pub(crate) commit_secs: Option<u64>,
    pub(crate) remote: Option<String>,
}

impl Default for RepoScript {
    fn default() -> Self {
        Self {
            branch: Some("main".to_string()),
            uncommitted: 0,
            upstream: Some("origin/main".to_string()),
            ahead: 0,
            behind: 0,
            commit_secs: Some(NOW_SECS - 7200),
            remote: Some("git@github.com:acme/widget.git".to_string()),
        }
    }
}

impl RepoScript {
    pub(crate) fn respond(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let out = match args.first().copied() {
            Some("symbolic-ref") => match &self.branch {
                Some(b) => CommandOutput::ok(&format!("{b}\n")),
                None => CommandOutput::with_code(1, "", ""),
            },
            Some("status") => {
                let lines: String = (0..self.uncommitted).map(|i| format!(" M f{i}\n")).collect();
                CommandOutput::ok(&lines)
            }
            Some("rev-parse") => match &self.upstream {
                Some(u) => CommandOutput::ok(&format!("{u}\n")),
                None => CommandOutput::with_code(128, "", "fatal: no upstream configured"),
            },
            Some("rev-list") => CommandOutput::ok(&format!("{}\t{}\n", self.ahead, self.behind)),
            Some("log") => match self.commit_secs {
                Some(ts) => CommandOutput::ok(&format!(
                    "abc123\u{1f}Add widget\u{1f}Dev Person\u{1f}{ts}\n"
                )),
                None => CommandOutput::with_code(128, "", "fatal: bad default revision 'HEAD'"),
            },
            Some("remote") => match &self.remote {
                Some(url) => CommandOutput::ok(&format!("{url}\n")),
                None => CommandOutput::with_code(2, "", "error: No such remote 'origin'"),
            },
            _ => CommandOutput::ok(""),
        };
        Ok(out)
    }
}

/// Issue tracker that counts how often it was asked.
pub(crate) struct CountingTracker {
    pub(crate) answer: Option<u64>,
    hits: AtomicUsize,
}

impl CountingTracker {
    pub(crate) fn new(answer: Option<u64>) -> Self {
        Self {
            answer,
            hits: AtomicUsize::new(0),
        }
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl IssueTracker for CountingTracker {
    fn open_issues(&self, _owner_repo: &str) -> Option<u64> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}
