//! Configuration schema for furl.toml
//!
//! ```toml
//! project = "web"
//!
//! [deploy]
//! namespace = "[[ project ]]-[[ env ]]"
//! release = "[[ project ]]-[[ env ]]"
//! ```

use serde::{Deserialize, Serialize};

/// Root configuration structure for furl.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name, the base of default namespace and release names
    pub project: String,

    /// Naming of the deployed namespace and release
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Namespace template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Slugify the rendered namespace (defaults to true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_slug: Option<bool>,

    /// Release template, may reference `[[ namespace ]]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,

    /// Slugify the rendered release (defaults to true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_slug: Option<bool>,
}

impl ProjectConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            deploy: DeployConfig::default(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.project.trim().is_empty() {
            anyhow::bail!("'project' must not be empty");
        }
        for (key, template) in [
            ("deploy.namespace", &self.deploy.namespace),
            ("deploy.release", &self.deploy.release),
        ] {
            if let Some(template) = template {
                super::template::check_syntax(template)
                    .map_err(|e| anyhow::anyhow!("Invalid template in '{}': {}", key, e))?;
            }
        }
        Ok(())
    }
}
