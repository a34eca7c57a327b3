//! Shared core types used across resolution and dismissal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DismissError;

/// Namespace and release a dismissal acts on.
///
/// Both fields are non-empty; the only constructor enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetIdentity {
    namespace: String,
    release: String,
}

impl TargetIdentity {
    pub fn new(
        namespace: impl Into<String>,
        release: impl Into<String>,
    ) -> Result<Self, DismissError> {
        let namespace = namespace.into();
        let release = release.into();
        if namespace.is_empty() {
            return Err(DismissError::EmptyIdentity("namespace"));
        }
        if release.is_empty() {
            return Err(DismissError::EmptyIdentity("release"));
        }
        Ok(Self { namespace, release })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn release(&self) -> &str {
        &self.release
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.release)
    }
}

/// Where the target identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentitySource {
    /// `--namespace` and `--release` given directly.
    ExplicitFlags,
    /// Read from a persisted deploy report.
    DeployReport,
    /// Derived from the project configuration in a git worktree.
    ProjectConfig,
}

impl IdentitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentitySource::ExplicitFlags => "explicit-flags",
            IdentitySource::DeployReport => "deploy-report",
            IdentitySource::ProjectConfig => "project-config",
        }
    }
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a git worktree with a project was found for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    Detected { work_tree: std::path::PathBuf },
    NotFound,
}

impl ProjectStatus {
    pub fn work_tree(&self) -> Option<&std::path::Path> {
        match self {
            ProjectStatus::Detected { work_tree } => Some(work_tree),
            ProjectStatus::NotFound => None,
        }
    }
}
