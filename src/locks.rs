use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One mutex per repository name, shared by scans and mutations so that a
/// probe, a fetch and a pull of the same working copy never overlap.
#[derive(Default)]
pub struct RepoLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RepoLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `name`; the same `Arc` for the lifetime of the registry.
    #[must_use]
    pub fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(name.to_string()).or_default())
    }
}

/// Block until `lock` is ours. The guarded value is `()`, so a poisoned lock
/// is still usable.
pub(crate) fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
