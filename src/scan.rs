use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::{ThreadPoolBuilder, prelude::*};
use walkdir::WalkDir;

use crate::cache::StatusCache;
use crate::error::DiscoveryError;
use crate::locks::{RepoLocks, acquire};
use crate::probe::{GitProbe, repo_name};
use crate::system::{Clock, FsOps};
use crate::types::{RepoStatus, SortOrder};

/// Immediate, non-hidden subdirectories of `root` that carry a `.git` marker,
/// sorted by name.
///
/// # Errors
/// Returns [`DiscoveryError::RootMissing`] when `root` does not exist and
/// [`DiscoveryError::RootUnreadable`] when it cannot be listed.
pub fn discover_repos(fs: &dyn FsOps, root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !root.exists() {
        return Err(DiscoveryError::RootMissing(root.to_path_buf()));
    }

    let mut repos = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(DiscoveryError::RootUnreadable {
                    path: root.to_path_buf(),
                    source,
                });
            }
            Err(err) => {
                log::debug!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_dir() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if fs.is_repo(entry.path()) {
            repos.push(entry.into_path());
        } else {
            log::debug!("not a repository: {}", entry.path().display());
        }
    }

    repos.sort_unstable_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(repos)
}

/// Cooperative cancellation for an in-flight scan.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub repos: Vec<RepoStatus>,
    pub error: Option<DiscoveryError>,
    /// Set when the scan was abandoned; `repos` then holds only finished probes.
    pub cancelled: bool,
}

/// Probes every repository under a root on a bounded pool and publishes each
/// record to the cache as it completes.
pub struct ScanCoordinator {
    probe: Arc<GitProbe>,
    fs: Arc<dyn FsOps>,
    clock: Arc<dyn Clock>,
    cache: Arc<StatusCache>,
    locks: Arc<RepoLocks>,
    concurrency: usize,
    show_progress: bool,
}

impl ScanCoordinator {
    #[must_use]
    pub fn new(
        probe: Arc<GitProbe>,
        fs: Arc<dyn FsOps>,
        clock: Arc<dyn Clock>,
        cache: Arc<StatusCache>,
        locks: Arc<RepoLocks>,
        concurrency: usize,
    ) -> Self {
        Self {
            probe,
            fs,
            clock,
            cache,
            locks,
            concurrency: concurrency.max(1),
            show_progress: false,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn scan(&self, root: &Path, order: SortOrder) -> ScanOutcome {
        self.scan_with_cancel(root, order, &CancelFlag::new())
    }

    pub fn scan_with_cancel(&self, root: &Path, order: SortOrder, cancel: &CancelFlag) -> ScanOutcome {
        let paths = match discover_repos(self.fs.as_ref(), root) {
            Ok(paths) => paths,
            Err(err) => {
                log::warn!("{err}");
                return ScanOutcome {
                    error: Some(err),
                    ..ScanOutcome::default()
                };
            }
        };
        log::debug!("root={} repos_found={}", root.display(), paths.len());

        let progress = self.progress_bar(paths.len());
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .thread_name(|i| format!("repodash-probe-{i}"))
            .build();
        let mut repos: Vec<RepoStatus> = match pool {
            Ok(pool) => pool.install(|| {
                paths
                    .par_iter()
                    .filter_map(|path| self.run_task(path, cancel, &progress))
                    .collect()
            }),
            Err(err) => {
                log::warn!("probe pool unavailable ({err}), probing sequentially");
                paths
                    .iter()
                    .filter_map(|path| self.run_task(path, cancel, &progress))
                    .collect()
            }
        };

        let cancelled = cancel.is_cancelled();
        if cancelled {
            progress.abandon_with_message("scan cancelled");
        } else {
            progress.finish_with_message("scan complete");
            let names: HashSet<String> = paths.iter().map(|p| repo_name(p)).collect();
            self.cache.retain(&names);
            self.cache.mark_refreshed(self.clock.now_utc());
        }

        order.sort(&mut repos);
        let failed = repos.iter().filter(|r| r.error.is_some()).count();
        log::info!(
            "scanned {} repositories under {} ({failed} with errors)",
            repos.len(),
            root.display()
        );
        ScanOutcome {
            repos,
            error: None,
            cancelled,
        }
    }

    fn run_task(&self, path: &Path, cancel: &CancelFlag, progress: &ProgressBar) -> Option<RepoStatus> {
        if cancel.is_cancelled() {
            return None;
        }
        let name = repo_name(path);
        let lock = self.locks.lock_for(&name);
        let _guard = acquire(&lock);

        let status = match panic::catch_unwind(AssertUnwindSafe(|| self.probe.probe(path))) {
            Ok(status) => status,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::warn!("{name}: probe panicked: {message}");
                RepoStatus::failed(
                    name,
                    path.to_path_buf(),
                    self.clock.now_utc(),
                    format!("probe panicked: {message}"),
                )
            }
        };
        self.cache.put(status.clone());
        progress.inc(1);
        Some(status)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len as u64);
        let style =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);
        progress.enable_steady_tick(Duration::from_millis(100));
        progress.set_message("probing repositories");
        progress
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
