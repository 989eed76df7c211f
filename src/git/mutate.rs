use std::path::Path;
use std::time::Duration;

use crate::error::CommandError;
use crate::process::CommandOutput;

use super::GitRunner;

pub(crate) const FETCH_ARGS: &[&str] = &["fetch", "--all", "--prune"];
pub(crate) const PULL_ARGS: &[&str] = &["pull", "--ff-only"];

/// Update remote-tracking refs of every remote. Never touches the working tree.
pub(crate) fn fetch(
    repo: &Path,
    git: &dyn GitRunner,
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    git.run_git(repo, FETCH_ARGS, timeout)
}

/// Fast-forward the current branch onto its upstream.
pub(crate) fn pull(
    repo: &Path,
    git: &dyn GitRunner,
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    git.run_git(repo, PULL_ARGS, timeout)
}

/// One-line summary of `git pull` output, if it printed something worth keeping.
pub(crate) fn pull_summary(stdout: &str) -> Option<String> {
    if stdout.contains("Already up to date") || stdout.contains("Already up-to-date") {
        return Some("Already up to date".to_string());
    }
    stdout
        .lines()
        .map(str::trim)
        .find(|line| line.contains("files changed") || line.contains("file changed"))
        .map(str::to_string)
}
