//! Advisory file locks shared by every furl process using the same home.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use fs4::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{LockGuard, LockProvider};

/// Written into the lock file by the current holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockHolder {
    pub namespace: String,
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FileLockProvider {
    locks_dir: PathBuf,
}

impl FileLockProvider {
    pub fn new(locks_dir: impl Into<PathBuf>) -> Self {
        Self {
            locks_dir: locks_dir.into(),
        }
    }

    pub fn locks_dir(&self) -> &Path {
        &self.locks_dir
    }

    /// Namespaces are user input; the file name is derived from a hash.
    pub fn lock_path(&self, namespace: &str) -> PathBuf {
        let hash = blake3::hash(namespace.as_bytes());
        self.locks_dir
            .join(format!("namespace-{}.lock", &hash.to_hex().as_str()[..16]))
    }

    /// Last recorded holder of a namespace lock, if any.
    pub fn holder(&self, namespace: &str) -> Option<LockHolder> {
        read_holder(&self.lock_path(namespace))
    }
}

impl LockProvider for FileLockProvider {
    fn acquire(&self, namespace: &str) -> anyhow::Result<LockGuard> {
        fs::create_dir_all(&self.locks_dir).with_context(|| {
            format!("Failed to create lock directory: {}", self.locks_dir.display())
        })?;

        let path = self.lock_path(namespace);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                match read_holder(&path) {
                    Some(holder) => info!(
                        namespace,
                        holder_pid = holder.pid,
                        since = %holder.acquired_at,
                        "Waiting for namespace lock"
                    ),
                    None => info!(namespace, "Waiting for namespace lock"),
                }
                file.lock_exclusive()
                    .with_context(|| format!("Failed to lock {}", path.display()))?;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to lock {}", path.display()));
            }
        }

        write_holder(&file, namespace)
            .with_context(|| format!("Failed to record lock holder in {}", path.display()))?;
        debug!(namespace, path = %path.display(), "Acquired namespace lock");

        let namespace_owned = namespace.to_string();
        Ok(LockGuard::new(namespace, move || {
            if let Err(err) = FileExt::unlock(&file) {
                warn!(namespace = %namespace_owned, %err, "Failed to unlock namespace lock");
            } else {
                debug!(namespace = %namespace_owned, "Released namespace lock");
            }
        }))
    }
}

fn write_holder(mut file: &File, namespace: &str) -> anyhow::Result<()> {
    let holder = LockHolder {
        namespace: namespace.to_string(),
        pid: std::process::id(),
        acquired_at: Utc::now(),
    };
    file.set_len(0)?;
    file.write_all(&serde_json::to_vec(&holder)?)?;
    file.flush()?;
    Ok(())
}

fn read_holder(path: &Path) -> Option<LockHolder> {
    let content = fs::read(path).ok()?;
    serde_json::from_slice(&content).ok()
}
