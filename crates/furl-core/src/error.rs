//! Error taxonomy for identity resolution and dismissal.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DismissError {
    #[error("--namespace or --release can't be used together with --use-deploy-report")]
    ConflictingSources,

    #[error(
        "no git with a furl project found: dismiss should either be executed in a git repository, \
         or with --namespace and --release specified, or with --use-deploy-report"
    )]
    NothingSpecified,

    #[error("--{given} specified, but not --{missing}, while should be specified both or none")]
    AsymmetricSpecification {
        given: &'static str,
        missing: &'static str,
    },

    #[error("unable to read deploy report file {path:?}")]
    ReportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to unmarshal deploy report file {path:?}")]
    ReportParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to get {} from deploy report file {path:?}", .missing.join(" and "))]
    ReportFieldMissing {
        path: PathBuf,
        missing: Vec<&'static str>,
    },

    #[error("unable to load project config")]
    ProjectConfig(#[source] anyhow::Error),

    #[error("invalid target: {0} must not be empty")]
    EmptyIdentity(&'static str),

    #[error("unable to acquire lock for namespace {namespace:?}")]
    LockAcquire {
        namespace: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("unable to check history of release {release:?}")]
    History {
        release: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("unable to uninstall release {release:?}")]
    Uninstall {
        release: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, DismissError>;
