use std::path::Path;
use std::time::Duration;

use crate::error::ProbeError;
use crate::process::CommandOutput;
use crate::types::DETACHED_BRANCH;

use super::GitRunner;

const FIELD_SEP: char = '\u{1f}';

/// Raw `git log -1` fields, before any relative-time labelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawCommit {
    pub(crate) hash: String,
    pub(crate) message: String,
    pub(crate) author: String,
    pub(crate) timestamp: i64,
}

pub(crate) fn exit_error(out: &CommandOutput) -> ProbeError {
    ProbeError::Exit {
        code: out
            .code
            .map_or_else(|| "signal".to_string(), |c| c.to_string()),
        stderr: out.stderr.trim().to_string(),
    }
}

/// Current branch name, or [`DETACHED_BRANCH`] when HEAD is detached.
///
/// Works on unborn branches, unlike `rev-parse --abbrev-ref HEAD`.
pub(crate) fn current_branch(
    repo: &Path,
    git: &dyn GitRunner,
    timeout: Duration,
) -> Result<String, ProbeError> {
    let out = git.run_git(repo, &["symbolic-ref", "--quiet", "--short", "HEAD"], timeout)?;
    match out.code {
        Some(0) => {
            let name = out.stdout.trim();
            if name.is_empty() {
                Ok(DETACHED_BRANCH.to_string())
            } else {
                Ok(name.to_string())
            }
        }
        Some(1) => Ok(DETACHED_BRANCH.to_string()),
        _ => Err(exit_error(&out)),
    }
}

/// The tracking reference of the current branch, `None` when there is none.
pub(crate) fn upstream_ref(
    repo: &Path,
    git: &dyn GitRunner,
    timeout: Duration,
) -> Result<Option<String>, ProbeError> {
    let out = git.run_git(
        repo,
        &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
        timeout,
    )?;
    if !out.success() {
        return Ok(None);
    }
    let uref = out.stdout.trim();
    if uref.is_empty() {
        Ok(None)
    } else {
        Ok(Some(uref.to_string()))
    }
}

/// `(ahead, behind)` of HEAD relative to `upstream`.
///
/// Ahead counts commits only reachable from HEAD, behind counts commits only
/// reachable from `upstream`.
pub(crate) fn ahead_behind(
    repo: &Path,
    git: &dyn GitRunner,
    upstream: &str,
    timeout: Duration,
) -> Result<(u64, u64), ProbeError> {
    let range = format!("HEAD...{upstream}");
    let out = git.run_git(repo, &["rev-list", "--left-right", "--count", &range], timeout)?;
    if !out.success() {
        return Err(exit_error(&out));
    }
    parse_left_right(&out.stdout)
}

fn parse_left_right(s: &str) -> Result<(u64, u64), ProbeError> {
    let mut parts = s.split_whitespace().map(str::parse::<u64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(left)), Some(Ok(right)), None) => Ok((left, right)),
        _ => Err(ProbeError::Parse(s.trim().to_string())),
    }
}

/// Metadata of the HEAD commit, `None` for a repository without commits.
pub(crate) fn last_commit(
    repo: &Path,
    git: &dyn GitRunner,
    timeout: Duration,
) -> Result<Option<RawCommit>, ProbeError> {
    let out = git.run_git(repo, &["log", "-1", "--format=%H%x1f%s%x1f%an%x1f%ct"], timeout)?;
    if !out.success() {
        return Ok(None);
    }
    let line = out.stdout.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return Ok(None);
    }
    parse_commit_line(line).map(Some)
}

fn parse_commit_line(line: &str) -> Result<RawCommit, ProbeError> {
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    let [hash, message, author, ts] = fields.as_slice() else {
        return Err(ProbeError::Parse(line.to_string()));
    };
    let timestamp = ts
        .trim()
        .parse::<i64>()
        .map_err(|_| ProbeError::Parse(line.to_string()))?;
    Ok(RawCommit {
        hash: hash.trim().to_string(),
        message: (*message).to_string(),
        author: (*author).to_string(),
        timestamp,
    })
}

/// URL of the `origin` remote, `None` when it is not configured.
pub(crate) fn remote_url(
    repo: &Path,
    git: &dyn GitRunner,
    timeout: Duration,
) -> Result<Option<String>, ProbeError> {
    let out = git.run_git(repo, &["remote", "get-url", "origin"], timeout)?;
    if !out.success() {
        return Ok(None);
    }
    let url = out.stdout.trim();
    if url.is_empty() {
        Ok(None)
    } else {
        Ok(Some(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_right_counts_parse_in_order() {
        assert_eq!(parse_left_right("3\t5\n").expect("parse"), (3, 5));
        assert!(parse_left_right("3").is_err());
        assert!(parse_left_right("x\t1").is_err());
    }

    #[test]
    fn commit_line_keeps_separators_out_of_fields() {
        let line = "abc123\u{1f}fix: a | b\u{1f}Dev Person\u{1f}1700000000";
        let commit = parse_commit_line(line).expect("parse");
        assert_eq!(commit.hash, "abc123");
        assert_eq!(commit.message, "fix: a | b");
        assert_eq!(commit.author, "Dev Person");
        assert_eq!(commit.timestamp, 1_700_000_000);
    }

    #[test]
    fn commit_line_with_missing_fields_is_rejected() {
        assert!(parse_commit_line("abc\u{1f}msg").is_err());
    }
}
