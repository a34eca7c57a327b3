//! Dismiss command implementation.
//!
//! Resolves the target, then removes the release (and optionally its
//! namespace) through the release manager.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::context::AppContext;
use crate::dismiss::{DismissOptions, DismissOutcome, Dismisser};
use crate::error::DismissError;
use crate::lock::LockProvider;
use crate::logging::LogStyle;
use crate::release::{HelmCli, KubeConnection, ReleaseHistory, Uninstaller};
use crate::resolve::{ResolveRequest, ResolvedTarget, resolve_target};
use crate::types::{IdentitySource, ProjectStatus};

/// Options for the dismiss command
#[derive(Debug, Clone)]
pub struct DismissRequest {
    /// Explicit namespace
    pub namespace: Option<String>,
    /// Explicit release
    pub release: Option<String>,
    /// Environment fed to the project naming templates
    pub environment: Option<String>,
    /// Take the target from the deploy report
    pub use_deploy_report: bool,
    /// Deploy report location, relative to the working directory
    pub deploy_report_path: Option<PathBuf>,
    /// Project config location, relative to the work tree
    pub config_path: Option<PathBuf>,
    /// Use this directory as the git work tree instead of discovery
    pub git_work_tree: Option<PathBuf>,
    /// Delete the namespace too
    pub with_namespace: bool,
    /// Delete release hooks too
    pub with_hooks: bool,
    pub kube_context: Option<String>,
    pub kube_config: Option<PathBuf>,
    pub kube_config_base64: Option<String>,
    /// Revisions fetched when checking the release; zero means all
    pub releases_history_max: u32,
    pub helm_bin: PathBuf,
    pub kubectl_bin: PathBuf,
    /// Emoji-decorated process names in logs
    pub pretty_log: bool,
    /// Hide release manager output unless it fails
    pub quiet: bool,
}

impl Default for DismissRequest {
    fn default() -> Self {
        Self {
            namespace: None,
            release: None,
            environment: None,
            use_deploy_report: false,
            deploy_report_path: None,
            config_path: None,
            git_work_tree: None,
            with_namespace: false,
            with_hooks: true,
            kube_context: None,
            kube_config: None,
            kube_config_base64: None,
            releases_history_max: 0,
            helm_bin: PathBuf::from("helm"),
            kubectl_bin: PathBuf::from("kubectl"),
            pretty_log: true,
            quiet: false,
        }
    }
}

impl DismissRequest {
    /// Target given by `--namespace` and `--release`
    pub fn explicit(namespace: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            release: Some(release.into()),
            ..Self::default()
        }
    }

    /// Target read from the deploy report
    pub fn from_deploy_report() -> Self {
        Self {
            use_deploy_report: true,
            ..Self::default()
        }
    }

    pub fn with_namespace_deletion(mut self) -> Self {
        self.with_namespace = true;
        self
    }

    fn options(&self) -> DismissOptions {
        DismissOptions {
            with_namespace: self.with_namespace,
            with_hooks: self.with_hooks,
        }
    }
}

/// Report from a dismiss operation
#[derive(Debug, Clone, Serialize)]
pub struct DismissReport {
    pub namespace: String,
    pub release: String,
    pub source: IdentitySource,
    pub outcome: DismissOutcome,
}

/// Dismiss command orchestrator
#[derive(Debug)]
pub struct DismissCommand {
    ctx: AppContext,
}

impl DismissCommand {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Work out the namespace and release without touching the cluster.
    pub fn resolve(&self, request: &DismissRequest) -> anyhow::Result<ResolvedTarget> {
        let project = if request.use_deploy_report {
            ProjectStatus::NotFound
        } else {
            self.ctx.project_status(request.git_work_tree.as_deref())?
        };
        if let Some(work_tree) = project.work_tree() {
            info!(work_tree = %work_tree.display(), "Using project work tree");
        }

        let resolve = ResolveRequest {
            namespace: request.namespace.clone(),
            release: request.release.clone(),
            environment: request.environment.clone(),
            use_deploy_report: request.use_deploy_report,
            deploy_report_path: self
                .ctx
                .deploy_report_path(request.deploy_report_path.as_deref()),
            config_path: request.config_path.clone(),
        };
        Ok(resolve_target(&resolve, &project)?)
    }

    /// Execute the dismiss command against the cluster through helm and kubectl
    pub fn execute(&self, request: &DismissRequest) -> anyhow::Result<DismissReport> {
        let resolved = self.resolve(request)?;

        let mut kube = KubeConnection::new(request.kube_context.clone(), request.kube_config.clone());
        if let Some(encoded) = request.kube_config_base64.as_deref().filter(|s| !s.is_empty()) {
            kube = kube.with_base64_config(encoded)?;
        }
        info!(context = kube.context_name(), "Using kube context");

        let helm = HelmCli::new(resolved.identity.namespace(), kube)
            .with_binaries(&request.helm_bin, &request.kubectl_bin)
            .with_history_max(request.releases_history_max)
            .with_deferred_output(request.quiet);
        let locks = self.ctx.lock_provider();

        self.dismiss_resolved(resolved, request, &helm, &helm, &locks)
    }

    /// Execute with caller-supplied release manager and lock provider
    pub fn execute_with(
        &self,
        request: &DismissRequest,
        history: &dyn ReleaseHistory,
        uninstaller: &dyn Uninstaller,
        locks: &dyn LockProvider,
    ) -> anyhow::Result<DismissReport> {
        let resolved = self.resolve(request)?;
        self.dismiss_resolved(resolved, request, history, uninstaller, locks)
    }

    fn dismiss_resolved(
        &self,
        resolved: ResolvedTarget,
        request: &DismissRequest,
        history: &dyn ReleaseHistory,
        uninstaller: &dyn Uninstaller,
        locks: &dyn LockProvider,
    ) -> anyhow::Result<DismissReport> {
        info!(source = %resolved.source, target = %resolved.identity, "Resolved dismiss target");
        let outcome = Dismisser::new(history, uninstaller, locks)
            .with_log_style(LogStyle::new(request.pretty_log))
            .dismiss(&resolved.identity, &request.options())
            .map_err(anyhow::Error::from)?;

        Ok(DismissReport {
            namespace: resolved.identity.namespace().to_string(),
            release: resolved.identity.release().to_string(),
            source: resolved.source,
            outcome,
        })
    }
}

/// Error kind of a failed dismissal, if it came from resolution or coordination.
pub fn dismiss_error(err: &anyhow::Error) -> Option<&DismissError> {
    err.downcast_ref::<DismissError>()
}
