//! In-memory release manager and lock provider for coordinator tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use furl_core::lock::{LockGuard, LockProvider};
use furl_core::release::{
    HistoryError, ReleaseHistory, ReleaseRecord, UninstallOptions, Uninstaller,
};

#[derive(Default)]
pub struct FakeCluster {
    releases: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, UninstallOptions)>>,
    fail_uninstall: bool,
    broken_history: bool,
    uninstall_delay: Option<Duration>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeCluster {
    pub fn with_releases(names: &[&str]) -> Self {
        Self {
            releases: Mutex::new(names.iter().map(|n| n.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn failing_uninstall(mut self) -> Self {
        self.fail_uninstall = true;
        self
    }

    pub fn broken_history(mut self) -> Self {
        self.broken_history = true;
        self
    }

    pub fn slow_uninstall(mut self, delay: Duration) -> Self {
        self.uninstall_delay = Some(delay);
        self
    }

    pub fn has_release(&self, name: &str) -> bool {
        self.releases.lock().unwrap().contains(name)
    }

    pub fn calls(&self) -> Vec<(String, UninstallOptions)> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of uninstalls observed running at once.
    pub fn max_concurrent_uninstalls(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl ReleaseHistory for FakeCluster {
    fn history(&self, release: &str) -> Result<Vec<ReleaseRecord>, HistoryError> {
        if self.broken_history {
            return Err(anyhow::anyhow!("cluster unreachable").into());
        }
        if !self.has_release(release) {
            return Err(HistoryError::NotFound);
        }
        Ok(vec![ReleaseRecord {
            revision: 1,
            status: "deployed".to_string(),
            chart: None,
            app_version: None,
            updated: None,
            description: None,
        }])
    }
}

impl Uninstaller for FakeCluster {
    fn uninstall(&self, release: &str, options: &UninstallOptions) -> anyhow::Result<()> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((release.to_string(), *options));
        if let Some(delay) = self.uninstall_delay {
            std::thread::sleep(delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_uninstall {
            anyhow::bail!("helm uninstall exploded");
        }
        self.releases.lock().unwrap().remove(release);
        Ok(())
    }
}

/// Counts acquisitions and releases without real locking.
#[derive(Default)]
pub struct CountingLocks {
    acquired: AtomicUsize,
    released: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingLocks {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl LockProvider for CountingLocks {
    fn acquire(&self, namespace: &str) -> anyhow::Result<LockGuard> {
        if self.fail {
            anyhow::bail!("lock backend unavailable");
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        let released = Arc::clone(&self.released);
        Ok(LockGuard::new(namespace, move || {
            released.fetch_add(1, Ordering::SeqCst);
        }))
    }
}
