//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use crate::lock::FileLockProvider;
use crate::project;
use crate::report;
use crate::types::ProjectStatus;

/// Paths shared by every command of one invocation.
///
/// Frontends create this once and pass it to commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    home_dir: PathBuf,
    work_dir: PathBuf,
}

impl AppContext {
    /// Create a new context with explicit paths.
    pub fn new(home_dir: PathBuf, work_dir: PathBuf) -> Self {
        Self { home_dir, work_dir }
    }

    /// Create a context from overrides, falling back to platform directories.
    pub fn with_defaults(
        home_dir: Option<PathBuf>,
        work_dir: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let current_dir = std::env::current_dir()?;
        let home_dir = match home_dir {
            Some(dir) => current_dir.join(dir),
            None => default_home_dir()?,
        };
        let work_dir = match work_dir {
            Some(dir) => current_dir.join(dir),
            None => current_dir,
        };
        Ok(Self::new(home_dir, work_dir))
    }

    /// Root of furl's own state (locks).
    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.home_dir.join("locks")
    }

    pub fn lock_provider(&self) -> FileLockProvider {
        FileLockProvider::new(self.locks_dir())
    }

    /// Detect the project work tree, or use `git_work_tree` when given.
    pub fn project_status(&self, git_work_tree: Option<&Path>) -> anyhow::Result<ProjectStatus> {
        match git_work_tree {
            Some(dir) => project::open_work_tree(&self.work_dir.join(dir)),
            None => project::discover_work_tree(&self.work_dir),
        }
    }

    pub fn deploy_report_path(&self, explicit: Option<&Path>) -> PathBuf {
        report::deploy_report_path(&self.work_dir, explicit)
    }
}

fn default_home_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = dirs::state_dir().or_else(dirs::data_local_dir) {
        return Ok(dir.join("furl"));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".furl"))
}
