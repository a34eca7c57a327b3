//! Log formatting helpers shared by the dismiss flow and frontends.

use std::io::Write;
use std::time::Instant;

use tracing::{info, warn};

use crate::types::TargetIdentity;

/// Decoration of process headers in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStyle {
    pretty: bool,
}

impl Default for LogStyle {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl LogStyle {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Plain names, for terminals that can't render emoji.
    pub fn plain() -> Self {
        Self { pretty: false }
    }

    pub fn release_process(&self, target: &TargetIdentity) -> String {
        let name = format!(
            "release {} [namespace {}]",
            target.release(),
            target.namespace()
        );
        self.decorate("⛵", name)
    }

    pub fn namespace_process(&self, namespace: &str) -> String {
        self.decorate("🗑", format!("namespace {namespace}"))
    }

    fn decorate(&self, icon: &str, name: String) -> String {
        if self.pretty {
            format!("{icon} {name}")
        } else {
            name
        }
    }
}

/// Run `f`, then log how long it took regardless of the outcome.
pub fn log_running_time<T>(f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    info!(
        "Running time {:.2} seconds",
        start.elapsed().as_secs_f64()
    );
    result
}

/// Run `run` with its output buffered when `defer` is set.
///
/// Deferred output reaches `out` only if `run` fails, so successful steps stay
/// quiet while failures keep their full context.
pub fn run_with_deferred_log<T>(
    defer: bool,
    out: &mut dyn Write,
    run: impl FnOnce(&mut dyn Write) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    if !defer {
        return run(out);
    }

    let mut buffer = Vec::new();
    let result = run(&mut buffer);
    if result.is_err() && !buffer.is_empty() {
        if let Err(err) = out.write_all(&buffer).and_then(|()| out.flush()) {
            warn!(%err, "Failed to replay deferred output");
        }
    }
    result
}
