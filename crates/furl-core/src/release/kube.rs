//! Cluster connection settings passed through to helm and kubectl.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tempfile::{NamedTempFile, TempPath};

#[derive(Debug, Default)]
pub struct KubeConnection {
    context: Option<String>,
    kubeconfig: Option<PathBuf>,
    // Keeps a decoded kubeconfig on disk for as long as the connection lives.
    decoded: Option<TempPath>,
}

impl KubeConnection {
    pub fn new(context: Option<String>, kubeconfig: Option<PathBuf>) -> Self {
        Self {
            context: context.filter(|c| !c.is_empty()),
            kubeconfig: kubeconfig.filter(|p| !p.as_os_str().is_empty()),
            decoded: None,
        }
    }

    /// Use a base64-encoded kubeconfig; it takes precedence over a path.
    pub fn with_base64_config(mut self, encoded: &str) -> anyhow::Result<Self> {
        let data = STANDARD
            .decode(encoded.trim())
            .context("Failed to decode base64 kubeconfig")?;
        let mut file = NamedTempFile::new().context("Failed to create kubeconfig temp file")?;
        file.write_all(&data)
            .context("Failed to write decoded kubeconfig")?;
        let path = file.into_temp_path();
        self.kubeconfig = Some(path.to_path_buf());
        self.decoded = Some(path);
        Ok(self)
    }

    pub fn kubeconfig(&self) -> Option<&Path> {
        self.kubeconfig.as_deref()
    }

    /// Context name for log output.
    pub fn context_name(&self) -> &str {
        self.context.as_deref().unwrap_or("default")
    }

    pub(crate) fn helm_args(&self) -> Vec<OsString> {
        self.args("--kube-context")
    }

    pub(crate) fn kubectl_args(&self) -> Vec<OsString> {
        self.args("--context")
    }

    fn args(&self, context_flag: &str) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(context) = &self.context {
            args.push(context_flag.into());
            args.push(context.into());
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push("--kubeconfig".into());
            args.push(kubeconfig.into());
        }
        args
    }
}
