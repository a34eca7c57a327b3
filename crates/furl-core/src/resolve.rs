//! Resolution of the namespace and release a dismissal targets.
//!
//! Exactly one identity source is consulted, in this order:
//! 1. the deploy report, when requested
//! 2. the project configuration, when a git work tree was found
//! 3. explicit `--namespace` and `--release`

use std::path::PathBuf;

use tracing::debug;

use crate::error::{DismissError, Result};
use crate::project::{self, ProjectConfigStore};
use crate::report::DeployReport;
use crate::types::{IdentitySource, ProjectStatus, TargetIdentity};

/// Inputs for [`resolve_target`]. Empty strings count as unset.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub namespace: Option<String>,
    pub release: Option<String>,
    pub environment: Option<String>,
    pub use_deploy_report: bool,
    /// Absolute location of the deploy report.
    pub deploy_report_path: PathBuf,
    /// Project config override, relative to the work tree.
    pub config_path: Option<PathBuf>,
}

impl ResolveRequest {
    pub fn explicit(namespace: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            release: Some(release.into()),
            ..Self::default()
        }
    }

    pub fn from_deploy_report(path: impl Into<PathBuf>) -> Self {
        Self {
            use_deploy_report: true,
            deploy_report_path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_environment(mut self, env: impl Into<String>) -> Self {
        self.environment = Some(env.into());
        self
    }

    fn namespace(&self) -> Option<&str> {
        non_empty(&self.namespace)
    }

    fn release(&self) -> Option<&str> {
        non_empty(&self.release)
    }

    fn environment(&self) -> Option<&str> {
        non_empty(&self.environment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub identity: TargetIdentity,
    pub source: IdentitySource,
}

pub fn resolve_target(request: &ResolveRequest, project: &ProjectStatus) -> Result<ResolvedTarget> {
    if request.use_deploy_report {
        if request.namespace().is_some() || request.release().is_some() {
            return Err(DismissError::ConflictingSources);
        }
        debug!(path = %request.deploy_report_path.display(), "reading deploy report");
        let identity = DeployReport::load_target(&request.deploy_report_path)?;
        return Ok(ResolvedTarget {
            identity,
            source: IdentitySource::DeployReport,
        });
    }

    if let ProjectStatus::Detected { work_tree } = project {
        let store = ProjectConfigStore::new(work_tree, request.config_path.as_deref());
        debug!(config = %store.config_path().display(), "deriving target from project config");
        let identity = from_project(request, &store).map_err(DismissError::ProjectConfig)?;
        return Ok(ResolvedTarget {
            identity,
            source: IdentitySource::ProjectConfig,
        });
    }

    let identity = match (request.namespace(), request.release()) {
        (None, None) => return Err(DismissError::NothingSpecified),
        (Some(_), None) => {
            return Err(DismissError::AsymmetricSpecification {
                given: "namespace",
                missing: "release",
            });
        }
        (None, Some(_)) => {
            return Err(DismissError::AsymmetricSpecification {
                given: "release",
                missing: "namespace",
            });
        }
        (Some(namespace), Some(release)) => TargetIdentity::new(namespace, release)?,
    };
    Ok(ResolvedTarget {
        identity,
        source: IdentitySource::ExplicitFlags,
    })
}

fn from_project(
    request: &ResolveRequest,
    store: &ProjectConfigStore,
) -> anyhow::Result<TargetIdentity> {
    let config = store.load()?;
    let env = request.environment();
    let namespace = project::kubernetes_namespace(request.namespace(), env, &config)?;
    let release = project::helm_release(request.release(), env, &namespace, &config)?;
    Ok(TargetIdentity::new(namespace, release)?)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
