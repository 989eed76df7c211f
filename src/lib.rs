#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

mod cache;
pub mod config;
mod error;
mod gateway;
mod git;
mod issues;
mod locks;
pub mod logging;
pub mod output;
mod probe;
mod process;
mod remote;
mod scan;
mod service;
mod system;
mod types;

#[cfg(test)]
mod testing;

pub use cache::StatusCache;
pub use error::{CommandError, ConfigError, DiscoveryError, MutationError, ProbeError};
pub use gateway::{MutationGateway, is_valid_repo_name};
pub use git::{DefaultGitRunner, GitRunner};
pub use issues::{DEFAULT_ISSUE_LIMIT, DisabledIssueTracker, GhIssueTracker, IssueTracker};
pub use locks::RepoLocks;
pub use probe::{GitProbe, relative_time};
pub use process::{CommandOutput, run_with_timeout};
pub use remote::canonical_identity;
pub use scan::{CancelFlag, ScanCoordinator, ScanOutcome, discover_repos};
pub use service::{Collaborators, Dashboard};
pub use system::{Clock, DefaultClock, DefaultFsOps, FsOps};
pub use types::{
    DEFAULT_CONCURRENCY, DETACHED_BRANCH, LastCommit, MutationOp, MutationRequest, MutationResult,
    PrecheckDetails, RepoStatus, Settings, Snapshot, SortOrder, Timeouts, UNKNOWN_BRANCH,
};
