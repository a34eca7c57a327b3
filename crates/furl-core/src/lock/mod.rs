//! Namespace-scoped mutual exclusion around destructive operations.

mod file;

pub use file::{FileLockProvider, LockHolder};

use crate::error::DismissError;

/// Hands out exclusive, blocking locks keyed by namespace.
pub trait LockProvider: Send + Sync {
    fn acquire(&self, namespace: &str) -> anyhow::Result<LockGuard>;
}

/// Held lock. Dropping it releases the lock exactly once.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard {
    namespace: String,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl LockGuard {
    pub fn new(namespace: impl Into<String>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            namespace: namespace.into(),
            release: Some(Box::new(release)),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// Run `f` while holding the namespace lock.
///
/// Acquisition failure aborts before `f` runs. The lock is released on every
/// exit path of `f`, including panics.
pub fn with_namespace_lock<T, E>(
    locks: &dyn LockProvider,
    namespace: &str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<DismissError>,
{
    let _guard = locks
        .acquire(namespace)
        .map_err(|source| DismissError::LockAcquire {
            namespace: namespace.to_string(),
            source,
        })?;
    f()
}
