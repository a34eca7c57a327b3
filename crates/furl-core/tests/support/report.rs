//! Deploy reports as a previous deploy would have left them.

use std::path::Path;

use furl_core::report::DeployReport;

pub fn write_report(path: &Path, report: &DeployReport) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create report dir");
    }
    let content = serde_json::to_vec_pretty(report).expect("serialize report");
    std::fs::write(path, content).expect("write report");
}
