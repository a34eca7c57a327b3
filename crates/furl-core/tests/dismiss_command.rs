//! End-to-end tests of the dismiss command with an in-memory cluster.

mod support;

use std::path::PathBuf;

use tempfile::TempDir;

use furl_core::commands::{DismissCommand, DismissRequest, dismiss_error};
use furl_core::context::AppContext;
use furl_core::dismiss::DismissOutcome;
use furl_core::error::DismissError;
use furl_core::report::DeployReport;
use furl_core::types::IdentitySource;

use support::cluster::{CountingLocks, FakeCluster};
use support::project::init_project;
use support::report::write_report;

fn command(temp: &TempDir, work_dir: PathBuf) -> DismissCommand {
    DismissCommand::new(AppContext::new(temp.path().join("home"), work_dir))
}

#[test]
fn dismisses_release_from_deploy_report() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("work");
    write_report(
        &work_dir.join(".furl-deploy-report.json"),
        &DeployReport::new("web-prod", "web"),
    );
    let cluster = FakeCluster::with_releases(&["web"]);
    let locks = CountingLocks::default();

    let report = command(&temp, work_dir)
        .execute_with(&DismissRequest::from_deploy_report(), &cluster, &cluster, &locks)
        .unwrap();

    assert_eq!(report.namespace, "web-prod");
    assert_eq!(report.release, "web");
    assert_eq!(report.source, IdentitySource::DeployReport);
    assert_eq!(report.outcome, DismissOutcome::Uninstalled);
    assert!(!cluster.has_release("web"));
}

#[test]
fn dismisses_project_release_for_environment() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    init_project(&project, "project = \"shop\"\n");
    let cluster = FakeCluster::with_releases(&["shop-staging"]);
    let locks = CountingLocks::default();
    let request = DismissRequest {
        environment: Some("staging".to_string()),
        git_work_tree: Some(project.clone()),
        ..DismissRequest::default()
    };

    let report = command(&temp, project)
        .execute_with(&request, &cluster, &cluster, &locks)
        .unwrap();

    assert_eq!(report.namespace, "shop-staging");
    assert_eq!(report.release, "shop-staging");
    assert_eq!(report.source, IdentitySource::ProjectConfig);
    assert_eq!(locks.acquired(), 1);
}

#[test]
fn namespace_deletion_reports_outcome() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("work");
    write_report(
        &work_dir.join(".furl-deploy-report.json"),
        &DeployReport::new("review-42", "app"),
    );
    let cluster = FakeCluster::default();
    let locks = CountingLocks::default();
    let request = DismissRequest::from_deploy_report().with_namespace_deletion();

    let report = command(&temp, work_dir)
        .execute_with(&request, &cluster, &cluster, &locks)
        .unwrap();

    assert_eq!(report.outcome, DismissOutcome::NamespaceDeleted);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"], "namespace-deleted");
    assert_eq!(json["source"], "deploy-report");
}

#[test]
fn conflicting_sources_fail_before_cluster_access() {
    let temp = TempDir::new().unwrap();
    let cluster = FakeCluster::with_releases(&["web"]);
    let locks = CountingLocks::default();
    let request = DismissRequest {
        namespace: Some("web-prod".to_string()),
        ..DismissRequest::from_deploy_report()
    };

    let err = command(&temp, temp.path().to_path_buf())
        .execute_with(&request, &cluster, &cluster, &locks)
        .unwrap_err();

    assert!(matches!(dismiss_error(&err), Some(DismissError::ConflictingSources)));
    assert!(cluster.calls().is_empty());
}

#[test]
fn uninstall_failure_is_surfaced() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("work");
    write_report(
        &work_dir.join(".furl-deploy-report.json"),
        &DeployReport::new("web-prod", "web"),
    );
    let cluster = FakeCluster::with_releases(&["web"]).failing_uninstall();
    let locks = CountingLocks::default();

    let err = command(&temp, work_dir)
        .execute_with(&DismissRequest::from_deploy_report(), &cluster, &cluster, &locks)
        .unwrap_err();

    assert!(matches!(dismiss_error(&err), Some(DismissError::Uninstall { .. })));
    assert!(format!("{err:#}").contains("helm uninstall exploded"));
    assert_eq!(locks.released(), 1);
}

#[test]
fn incomplete_report_takes_no_lock() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(".furl-deploy-report.json"), r#"{"namespace":""}"#).unwrap();
    let cluster = FakeCluster::with_releases(&["web"]);
    let locks = CountingLocks::default();

    let err = command(&temp, temp.path().to_path_buf())
        .execute_with(&DismissRequest::from_deploy_report(), &cluster, &cluster, &locks)
        .unwrap_err();

    assert!(matches!(
        dismiss_error(&err),
        Some(DismissError::ReportFieldMissing { .. })
    ));
    assert_eq!(locks.acquired(), 0);
    assert!(cluster.calls().is_empty());
}
