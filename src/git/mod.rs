mod metrics;
mod mutate;
mod refs;
mod runner;

pub use runner::{DefaultGitRunner, GitRunner};

pub(crate) use metrics::uncommitted_count;
pub(crate) use mutate::{fetch, pull, pull_summary};
pub(crate) use refs::{RawCommit, ahead_behind, current_branch, last_commit, remote_url, upstream_ref};

#[cfg(test)]
pub(crate) use mutate::{FETCH_ARGS, PULL_ARGS};
