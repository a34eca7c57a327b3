//! Git worktree discovery for project-derived identities.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;
use git2::{ErrorCode, Repository, RepositoryOpenFlags};

use crate::types::ProjectStatus;

/// Walk up from `start` looking for a git worktree.
///
/// A missing repository or a bare one is reported as [`ProjectStatus::NotFound`];
/// any other git failure is an error. `GIT_CEILING_DIRECTORIES` bounds the walk.
pub fn discover_work_tree(start: &Path) -> anyhow::Result<ProjectStatus> {
    let repo = match Repository::open_ext(start, RepositoryOpenFlags::empty(), ceiling_dirs()) {
        Ok(repo) => repo,
        Err(err) if err.code() == ErrorCode::NotFound => return Ok(ProjectStatus::NotFound),
        Err(err) => {
            return Err(err).with_context(|| {
                format!("Failed to discover git repository from {}", start.display())
            });
        }
    };

    match repo.workdir() {
        Some(work_tree) => Ok(ProjectStatus::Detected {
            work_tree: normalize(work_tree),
        }),
        None => Ok(ProjectStatus::NotFound),
    }
}

/// Use an explicitly configured worktree instead of discovery.
pub fn open_work_tree(work_tree: &Path) -> anyhow::Result<ProjectStatus> {
    let repo = Repository::open(work_tree)
        .with_context(|| format!("Not a git work tree: {}", work_tree.display()))?;
    let work_tree = repo
        .workdir()
        .ok_or_else(|| anyhow::anyhow!("Git repository has no work tree: {}", work_tree.display()))?;
    Ok(ProjectStatus::Detected {
        work_tree: normalize(work_tree),
    })
}

fn ceiling_dirs() -> Vec<OsString> {
    std::env::var_os("GIT_CEILING_DIRECTORIES")
        .map(|value| {
            std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::into_os_string)
                .collect()
        })
        .unwrap_or_default()
}

// libgit2 reports workdirs with a trailing separator.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
