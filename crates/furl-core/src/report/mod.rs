//! Persisted deploy report: the namespace and release of the last deploy.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DismissError;
use crate::types::TargetIdentity;

/// File name used when no explicit report path is given.
pub const DEFAULT_DEPLOY_REPORT_FILE: &str = ".furl-deploy-report.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployReport {
    #[serde(default)]
    pub release: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl DeployReport {
    pub fn new(namespace: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            release: release.into(),
            namespace: namespace.into(),
            revision: None,
            status: None,
        }
    }

    /// Read and validate a report, yielding the target it describes.
    pub fn load_target(path: &Path) -> Result<TargetIdentity, DismissError> {
        let bytes = std::fs::read(path).map_err(|source| DismissError::ReportRead {
            path: path.to_path_buf(),
            source,
        })?;
        let report: DeployReport =
            serde_json::from_slice(&bytes).map_err(|source| DismissError::ReportParse {
                path: path.to_path_buf(),
                source,
            })?;
        report.into_target(path)
    }

    fn into_target(self, path: &Path) -> Result<TargetIdentity, DismissError> {
        let mut missing = Vec::new();
        if self.namespace.is_empty() {
            missing.push("namespace");
        }
        if self.release.is_empty() {
            missing.push("release");
        }
        if !missing.is_empty() {
            return Err(DismissError::ReportFieldMissing {
                path: path.to_path_buf(),
                missing,
            });
        }
        TargetIdentity::new(self.namespace, self.release)
    }

}

/// Resolve the report path against the working directory.
pub fn deploy_report_path(work_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => work_dir.join(path),
        None => work_dir.join(DEFAULT_DEPLOY_REPORT_FILE),
    }
}
