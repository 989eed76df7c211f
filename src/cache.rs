use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::types::{RepoStatus, Snapshot, SortOrder};

/// Last known status per repository.
///
/// Records are replaced whole, never merged. Writers hold the repository's
/// lock from [`crate::locks::RepoLocks`] while they `put`.
#[derive(Default)]
pub struct StatusCache {
    entries: RwLock<HashMap<String, RepoStatus>>,
    refreshed_at: RwLock<Option<DateTime<Utc>>>,
}

impl StatusCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, order: SortOrder) -> Snapshot {
        let mut repos: Vec<RepoStatus> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        order.sort(&mut repos);
        Snapshot {
            taken_at: *self
                .refreshed_at
                .read()
                .unwrap_or_else(PoisonError::into_inner),
            repos,
        }
    }

    pub fn put(&self, status: RepoStatus) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(status.name.clone(), status);
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<RepoStatus> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Drop every entry whose name is not in `names`.
    pub fn retain(&self, names: &HashSet<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|name, _| names.contains(name));
    }

    pub fn mark_refreshed(&self, at: DateTime<Utc>) {
        *self
            .refreshed_at
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(at);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
