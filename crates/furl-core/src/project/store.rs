//! Config store for loading furl.toml from a project work tree.

use std::path::{Path, PathBuf};

use super::{ProjectConfig, parser};

/// Config file name looked up in the work tree root.
pub const DEFAULT_CONFIG_FILE: &str = "furl.toml";

#[derive(Debug, Clone)]
pub struct ProjectConfigStore {
    config_path: PathBuf,
}

impl ProjectConfigStore {
    /// `config` is resolved relative to the work tree unless absolute.
    pub fn new(work_tree: &Path, config: Option<&Path>) -> Self {
        let config_path = match config {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => work_tree.join(path),
            None => work_tree.join(DEFAULT_CONFIG_FILE),
        };
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Unlike optional scoped configs, a project config is required.
    pub fn load(&self) -> anyhow::Result<ProjectConfig> {
        if !self.config_path.exists() {
            anyhow::bail!(
                "Project config not found: {}",
                self.config_path.display()
            );
        }
        parser::parse_project_toml(&self.config_path)
    }
}
