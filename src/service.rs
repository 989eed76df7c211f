use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::StatusCache;
use crate::git::{DefaultGitRunner, GitRunner};
use crate::gateway::MutationGateway;
use crate::issues::{DisabledIssueTracker, IssueTracker};
use crate::locks::RepoLocks;
use crate::probe::GitProbe;
use crate::scan::{CancelFlag, ScanCoordinator, ScanOutcome};
use crate::system::{Clock, DefaultClock, DefaultFsOps, FsOps};
use crate::types::{MutationRequest, MutationResult, Settings, Snapshot, SortOrder};

/// The external effects a [`Dashboard`] runs against.
pub struct Collaborators {
    pub git: Arc<dyn GitRunner>,
    pub issues: Arc<dyn IssueTracker>,
    pub fs: Arc<dyn FsOps>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Real git, filesystem and clock with the given issue tracker.
    #[must_use]
    pub fn system(issues: Arc<dyn IssueTracker>) -> Self {
        Self {
            git: Arc::new(DefaultGitRunner),
            issues,
            fs: Arc::new(DefaultFsOps),
            clock: Arc::new(DefaultClock),
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::system(Arc::new(DisabledIssueTracker))
    }
}

/// Status and sync operations over every repository under one root.
///
/// This is the surface a presentation layer talks to: `status` is the
/// cached snapshot, `refresh` rescans, `fetch`/`pull` go through the
/// mutation gateway.
pub struct Dashboard {
    root: PathBuf,
    sort: SortOrder,
    cache: Arc<StatusCache>,
    scanner: ScanCoordinator,
    gateway: MutationGateway,
}

impl Dashboard {
    #[must_use]
    pub fn new(settings: &Settings, deps: Collaborators) -> Self {
        let root = deps.fs.expand_tilde(&settings.root);
        let cache = Arc::new(StatusCache::new());
        let locks = Arc::new(RepoLocks::new());
        let probe = Arc::new(GitProbe::new(
            Arc::clone(&deps.git),
            deps.issues,
            Arc::clone(&deps.clock),
            settings.timeouts.read,
            settings.hosts.clone(),
        ));
        let scanner = ScanCoordinator::new(
            Arc::clone(&probe),
            Arc::clone(&deps.fs),
            deps.clock,
            Arc::clone(&cache),
            Arc::clone(&locks),
            settings.concurrency,
        )
        .with_progress(settings.show_progress);
        let gateway = MutationGateway::new(
            root.clone(),
            deps.git,
            deps.fs,
            probe,
            Arc::clone(&cache),
            locks,
            settings.timeouts,
        );
        Self {
            root,
            sort: settings.sort,
            cache,
            scanner,
            gateway,
        }
    }

    #[must_use]
    pub fn default_sort(&self) -> SortOrder {
        self.sort
    }

    /// Last known status of every repository.
    #[must_use]
    pub fn status(&self, order: SortOrder) -> Snapshot {
        self.cache.get(order)
    }

    pub fn refresh(&self, order: SortOrder) -> ScanOutcome {
        self.scanner.scan(&self.root, order)
    }

    pub fn refresh_with_cancel(&self, order: SortOrder, cancel: &CancelFlag) -> ScanOutcome {
        self.scanner.scan_with_cancel(&self.root, order, cancel)
    }

    pub fn fetch(&self, repo: &str) -> MutationResult {
        self.gateway.fetch(repo)
    }

    pub fn pull(&self, repo: &str, confirmed: bool) -> MutationResult {
        self.gateway.pull(repo, confirmed)
    }

    pub fn execute(&self, request: &MutationRequest) -> MutationResult {
        self.gateway.execute(request)
    }
}
