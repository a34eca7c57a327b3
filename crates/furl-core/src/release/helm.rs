//! Release backend driving the `helm` and `kubectl` binaries.

use std::ffi::{OsStr, OsString};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;
use tracing::{debug, info, warn};

use super::kube::KubeConnection;
use super::{HistoryError, ReleaseHistory, ReleaseRecord, UninstallOptions, Uninstaller};
use crate::logging::run_with_deferred_log;

/// Helm's storage driver reports a missing release with this message.
const RELEASE_NOT_FOUND: &str = "release: not found";

pub fn is_release_not_found(stderr: &str) -> bool {
    stderr.contains(RELEASE_NOT_FOUND)
}

/// Release manager bound to one namespace.
#[derive(Debug)]
pub struct HelmCli {
    namespace: String,
    kube: KubeConnection,
    helm_bin: PathBuf,
    kubectl_bin: PathBuf,
    history_max: Option<u32>,
    defer_output: bool,
}

struct CommandOutput {
    success: bool,
    stdout: Vec<u8>,
    stderr: String,
}

impl HelmCli {
    pub fn new(namespace: impl Into<String>, kube: KubeConnection) -> Self {
        Self {
            namespace: namespace.into(),
            kube,
            helm_bin: PathBuf::from("helm"),
            kubectl_bin: PathBuf::from("kubectl"),
            history_max: None,
            defer_output: false,
        }
    }

    pub fn with_binaries(mut self, helm: impl Into<PathBuf>, kubectl: impl Into<PathBuf>) -> Self {
        self.helm_bin = helm.into();
        self.kubectl_bin = kubectl.into();
        self
    }

    /// Limit on the revisions fetched by [`ReleaseHistory::history`]; zero means no limit.
    pub fn with_history_max(mut self, max: u32) -> Self {
        self.history_max = (max > 0).then_some(max);
        self
    }

    /// Only show helm/kubectl output when a step fails.
    pub fn with_deferred_output(mut self, defer: bool) -> Self {
        self.defer_output = defer;
        self
    }

    fn history_args(&self, release: &str) -> Vec<OsString> {
        let mut args = self.helm_base("history", release);
        args.extend(["--output".into(), "json".into()]);
        if let Some(max) = self.history_max {
            args.extend(["--max".into(), max.to_string().into()]);
        }
        args
    }

    fn hooks_args(&self, release: &str, revision: u32) -> Vec<OsString> {
        let mut args = vec![OsString::from("get")];
        args.extend(self.helm_base("hooks", release));
        args.extend(["--revision".into(), revision.to_string().into()]);
        args
    }

    fn uninstall_args(&self, release: &str) -> Vec<OsString> {
        let mut args = self.helm_base("uninstall", release);
        args.push("--wait".into());
        args
    }

    fn delete_manifest_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "delete".into(),
            "--ignore-not-found".into(),
            "--namespace".into(),
            self.namespace.as_str().into(),
            "-f".into(),
            "-".into(),
        ];
        args.extend(self.kube.kubectl_args());
        args
    }

    fn delete_namespace_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "delete".into(),
            "namespace".into(),
            self.namespace.as_str().into(),
            "--ignore-not-found".into(),
            "--wait".into(),
        ];
        args.extend(self.kube.kubectl_args());
        args
    }

    fn helm_base(&self, subcommand: &str, release: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            subcommand.into(),
            release.into(),
            "--namespace".into(),
            self.namespace.as_str().into(),
        ];
        args.extend(self.kube.helm_args());
        args
    }

    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        stdin: Option<&[u8]>,
    ) -> anyhow::Result<CommandOutput> {
        debug!(
            program = %program.display(),
            args = ?args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>(),
            "Running release manager command"
        );
        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to invoke {}", display(program, args)))?;

        // The child may exit before reading all of stdin; its exit status and
        // stderr are what gets reported then, not the broken pipe.
        let pipe = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = pipe.zip(stdin).map(|(mut pipe, input)| {
                scope.spawn(move || pipe.write_all(input))
            });
            let output = child.wait_with_output();
            let written = match writer.map(|w| w.join()) {
                None | Some(Ok(Ok(()))) => Ok(()),
                Some(Ok(Err(err))) => Err(err),
                Some(Err(_)) => Err(std::io::Error::other("stdin writer panicked")),
            };
            (output, written)
        });
        let output =
            output.with_context(|| format!("Failed to wait for {}", display(program, args)))?;

        let success = output.status.success();
        match written {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::BrokenPipe || !success => {
                debug!(program = %program.display(), %err, "Command did not read all of stdin");
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to write stdin of {}", program.display()));
            }
        }

        Ok(CommandOutput {
            success,
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Hook manifests of every fetched revision, each distinct document once.
    ///
    /// `None` if the release is gone or has no hooks.
    fn hook_manifests(&self, release: &str) -> anyhow::Result<Option<String>> {
        let records = match self.history(release) {
            Ok(records) => records,
            Err(HistoryError::NotFound) => return Ok(None),
            Err(HistoryError::Other(err)) => return Err(err),
        };

        let mut documents: Vec<String> = Vec::new();
        for record in &records {
            let args = self.hooks_args(release, record.revision);
            let output = self.run(&self.helm_bin, &args, None)?;
            if !output.success {
                if is_release_not_found(&output.stderr) {
                    warn!(
                        release,
                        revision = record.revision,
                        "Revision vanished while reading hooks"
                    );
                    continue;
                }
                anyhow::bail!("{} failed: {}", display(&self.helm_bin, &args), output.stderr);
            }
            let manifests =
                String::from_utf8(output.stdout).context("Hook manifests are not valid UTF-8")?;
            for document in split_documents(&manifests) {
                if !documents.iter().any(|known| known == document) {
                    documents.push(document.to_string());
                }
            }
        }

        if documents.is_empty() {
            return Ok(None);
        }
        debug!(
            release,
            revisions = records.len(),
            hooks = documents.len(),
            "Collected release hooks"
        );
        Ok(Some(
            documents
                .iter()
                .map(|d| format!("---\n{d}\n"))
                .collect::<String>(),
        ))
    }

    fn uninstall_steps(
        &self,
        release: &str,
        options: &UninstallOptions,
        out: &mut dyn Write,
    ) -> anyhow::Result<()> {
        let hooks = if options.delete_hooks {
            self.hook_manifests(release)?
        } else {
            None
        };

        let args = self.uninstall_args(release);
        let output = self.run(&self.helm_bin, &args, None)?;
        out.write_all(&output.stdout)?;
        if !output.success {
            let absent = is_release_not_found(&output.stderr);
            if !(absent && (options.dont_fail_if_no_release || options.delete_namespace)) {
                anyhow::bail!("{} failed: {}", display(&self.helm_bin, &args), output.stderr);
            }
            writeln!(out, "Release {release:?} not found in namespace {:?}", self.namespace)?;
        }

        if let Some(manifests) = hooks {
            info!(release, namespace = %self.namespace, "Deleting release hooks");
            let args = self.delete_manifest_args();
            let output = self.run(&self.kubectl_bin, &args, Some(manifests.as_bytes()))?;
            out.write_all(&output.stdout)?;
            if !output.success {
                anyhow::bail!("{} failed: {}", display(&self.kubectl_bin, &args), output.stderr);
            }
        }

        if options.delete_namespace {
            info!(namespace = %self.namespace, "Deleting namespace");
            let args = self.delete_namespace_args();
            let output = self.run(&self.kubectl_bin, &args, None)?;
            out.write_all(&output.stdout)?;
            if !output.success {
                anyhow::bail!("{} failed: {}", display(&self.kubectl_bin, &args), output.stderr);
            }
        }

        Ok(())
    }
}

impl ReleaseHistory for HelmCli {
    fn history(&self, release: &str) -> Result<Vec<ReleaseRecord>, HistoryError> {
        let args = self.history_args(release);
        let output = self.run(&self.helm_bin, &args, None)?;
        if !output.success {
            if is_release_not_found(&output.stderr) {
                return Err(HistoryError::NotFound);
            }
            return Err(anyhow::anyhow!(
                "{} failed: {}",
                display(&self.helm_bin, &args),
                output.stderr
            )
            .into());
        }
        let records: Vec<ReleaseRecord> = serde_json::from_slice(&output.stdout)
            .context("Failed to parse helm history output")?;
        Ok(records)
    }
}

impl Uninstaller for HelmCli {
    fn uninstall(&self, release: &str, options: &UninstallOptions) -> anyhow::Result<()> {
        let mut stderr = std::io::stderr().lock();
        run_with_deferred_log(self.defer_output, &mut stderr, |out| {
            self.uninstall_steps(release, options, out)
        })
    }
}

fn display(program: &Path, args: &[OsString]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&OsStr::to_string_lossy(arg));
    }
    line
}

/// YAML documents of a multi-document stream, trimmed, empty ones dropped.
fn split_documents(stream: &str) -> Vec<&str> {
    let mut documents = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    for line in stream.split_inclusive('\n') {
        if line.trim_end() == "---" {
            documents.push(&stream[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    documents.push(&stream[start..]);
    documents
        .into_iter()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect()
}
