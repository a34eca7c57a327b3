//! Uninstall coordination for a resolved target.
//!
//! Two paths lead to a terminal state:
//! - namespace deletion: the delegate runs directly, without a lock
//! - locked uninstall: the release history is checked first, and the delegate
//!   runs under the namespace lock only if the release exists

use serde::Serialize;
use tracing::info;

use crate::error::{DismissError, Result};
use crate::lock::{LockProvider, with_namespace_lock};
use crate::logging::LogStyle;
use crate::release::{HistoryError, ReleaseHistory, UninstallOptions, Uninstaller};
use crate::types::TargetIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissOptions {
    /// Delete the namespace after the release.
    pub with_namespace: bool,
    /// Delete hook resources of the release.
    pub with_hooks: bool,
}

impl Default for DismissOptions {
    fn default() -> Self {
        Self {
            with_namespace: false,
            with_hooks: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DismissOutcome {
    /// The release was uninstalled under the namespace lock.
    Uninstalled,
    /// The release and its namespace were deleted.
    NamespaceDeleted,
    /// Nothing to do: the release does not exist.
    AlreadyAbsent,
}

impl DismissOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DismissOutcome::Uninstalled => "uninstalled",
            DismissOutcome::NamespaceDeleted => "namespace-deleted",
            DismissOutcome::AlreadyAbsent => "already-absent",
        }
    }
}

pub struct Dismisser<'a> {
    history: &'a dyn ReleaseHistory,
    uninstaller: &'a dyn Uninstaller,
    locks: &'a dyn LockProvider,
    style: LogStyle,
}

impl<'a> Dismisser<'a> {
    pub fn new(
        history: &'a dyn ReleaseHistory,
        uninstaller: &'a dyn Uninstaller,
        locks: &'a dyn LockProvider,
    ) -> Self {
        Self {
            history,
            uninstaller,
            locks,
            style: LogStyle::default(),
        }
    }

    pub fn with_log_style(mut self, style: LogStyle) -> Self {
        self.style = style;
        self
    }

    pub fn dismiss(
        &self,
        target: &TargetIdentity,
        options: &DismissOptions,
    ) -> Result<DismissOutcome> {
        let namespace = target.namespace();
        let release = target.release();

        info!(namespace, "Using namespace: {}", namespace);
        info!(release, "Using release: {}", release);
        info!("{}", self.style.release_process(target));

        let uninstall = UninstallOptions {
            delete_namespace: options.with_namespace,
            delete_hooks: options.with_hooks,
            dont_fail_if_no_release: true,
        };

        if options.with_namespace {
            // TODO: take the namespace lock here once releasing it no longer races the namespace deletion
            info!("{}", self.style.namespace_process(namespace));
            self.run_uninstall(release, &uninstall)?;
            return Ok(DismissOutcome::NamespaceDeleted);
        }

        match self.history.history(release) {
            Err(HistoryError::NotFound) => {
                info!(release, namespace, "No such release {:?}", release);
                return Ok(DismissOutcome::AlreadyAbsent);
            }
            Err(HistoryError::Other(source)) => {
                return Err(DismissError::History {
                    release: release.to_string(),
                    source,
                });
            }
            Ok(records) => {
                info!(release, revisions = records.len(), "Found release");
            }
        }

        with_namespace_lock(self.locks, namespace, || {
            self.run_uninstall(release, &uninstall)
        })?;
        Ok(DismissOutcome::Uninstalled)
    }

    fn run_uninstall(&self, release: &str, options: &UninstallOptions) -> Result<()> {
        self.uninstaller
            .uninstall(release, options)
            .map_err(|source| DismissError::Uninstall {
                release: release.to_string(),
                source,
            })
    }
}
