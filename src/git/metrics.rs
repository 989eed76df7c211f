use std::path::Path;
use std::time::Duration;

use crate::error::ProbeError;

use super::{GitRunner, refs::exit_error};

/// Number of working-tree entries that differ from HEAD, untracked files included.
pub(crate) fn uncommitted_count(
    repo: &Path,
    git: &dyn GitRunner,
    timeout: Duration,
) -> Result<u64, ProbeError> {
    let out = git.run_git(repo, &["status", "--porcelain"], timeout)?;
    if !out.success() {
        return Err(exit_error(&out));
    }
    Ok(count_lines(&out.stdout))
}

fn count_lines(s: &str) -> u64 {
    s.lines().filter(|l| !l.trim().is_empty()).count() as u64
}
