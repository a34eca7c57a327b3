//! Furl Core Library
//!
//! Resolves which namespace and release to dismiss, serializes dismissals
//! per namespace, and drives the release manager that removes them.

pub mod commands;
pub mod context;
pub mod dismiss;
pub mod error;
pub mod lock;
pub mod logging;
pub mod project;
pub mod release;
pub mod report;
pub mod resolve;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Commands
    pub use crate::commands::{DismissCommand, DismissReport, DismissRequest};
    pub use crate::context::AppContext;

    // Resolution
    pub use crate::error::DismissError;
    pub use crate::report::DeployReport;
    pub use crate::resolve::{ResolveRequest, ResolvedTarget, resolve_target};
    pub use crate::types::{IdentitySource, ProjectStatus, TargetIdentity};

    // Coordination
    pub use crate::dismiss::{DismissOptions, DismissOutcome, Dismisser};
    pub use crate::lock::{FileLockProvider, LockGuard, LockProvider};
    pub use crate::release::{
        HelmCli, HistoryError, KubeConnection, ReleaseHistory, ReleaseRecord, UninstallOptions,
        Uninstaller,
    };
}
