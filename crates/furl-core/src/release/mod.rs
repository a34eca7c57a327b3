//! Seams to the external release manager.
//!
//! The dismiss flow only needs two things from it: the history of a release
//! (or the fact that it does not exist) and an uninstall routine.

mod helm;
mod kube;

pub use helm::{HelmCli, is_release_not_found};
pub use kube::KubeConnection;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One revision of a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub revision: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("release: not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub trait ReleaseHistory {
    fn history(&self, release: &str) -> Result<Vec<ReleaseRecord>, HistoryError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallOptions {
    /// Delete the namespace after the release.
    pub delete_namespace: bool,
    /// Delete hook resources recorded in the release revisions.
    pub delete_hooks: bool,
    /// Treat a release that vanished in the meantime as success.
    pub dont_fail_if_no_release: bool,
}

pub trait Uninstaller {
    fn uninstall(&self, release: &str, options: &UninstallOptions) -> anyhow::Result<()>;
}
