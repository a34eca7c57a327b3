//! Tests for reading the deploy report.

mod support;

use tempfile::TempDir;

use furl_core::error::DismissError;
use furl_core::report::DeployReport;

use support::report::write_report;

#[test]
fn written_report_loads_back_as_target() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out/report.json");
    let report = DeployReport {
        revision: Some(3),
        status: Some("deployed".to_string()),
        ..DeployReport::new("web-prod", "web")
    };

    write_report(&path, &report);
    let target = DeployReport::load_target(&path).unwrap();

    assert_eq!(target.namespace(), "web-prod");
    assert_eq!(target.release(), "web");
}

#[test]
fn missing_file_is_a_read_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");

    let err = DeployReport::load_target(&path).unwrap_err();

    assert!(matches!(err, DismissError::ReportRead { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("report.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = DeployReport::load_target(&path).unwrap_err();
    assert!(matches!(err, DismissError::ReportParse { .. }));
}

#[test]
fn empty_report_lists_every_missing_field() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("report.json");
    std::fs::write(&path, "{}").unwrap();

    let err = DeployReport::load_target(&path).unwrap_err();

    match err {
        DismissError::ReportFieldMissing { missing, .. } => {
            assert_eq!(missing, vec!["namespace", "release"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_namespace_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("report.json");
    std::fs::write(&path, r#"{"release":"web"}"#).unwrap();

    let err = DeployReport::load_target(&path).unwrap_err();
    assert!(err.to_string().contains("unable to get namespace"), "{err}");
}
