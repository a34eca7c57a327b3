//! Namespace and release names derived from the project configuration.

use super::schema::ProjectConfig;
use super::slug::{self, NAMESPACE_MAX_LEN, RELEASE_MAX_LEN};
use super::template::{self, TemplateVars};

const TEMPLATE_WITH_ENV: &str = "[[ project ]]-[[ env ]]";
const TEMPLATE_WITHOUT_ENV: &str = "[[ project ]]";

/// Namespace for this project and environment.
///
/// An explicit value wins and is used verbatim.
pub fn kubernetes_namespace(
    explicit: Option<&str>,
    env: Option<&str>,
    config: &ProjectConfig,
) -> anyhow::Result<String> {
    if let Some(namespace) = explicit.filter(|s| !s.is_empty()) {
        return Ok(namespace.to_string());
    }

    let vars = TemplateVars {
        project: &config.project,
        env,
        namespace: None,
    };
    render_name(
        "namespace",
        config.deploy.namespace.as_deref(),
        config.deploy.namespace_slug,
        vars,
        NAMESPACE_MAX_LEN,
    )
}

/// Release for this project, environment and already resolved namespace.
pub fn helm_release(
    explicit: Option<&str>,
    env: Option<&str>,
    namespace: &str,
    config: &ProjectConfig,
) -> anyhow::Result<String> {
    if let Some(release) = explicit.filter(|s| !s.is_empty()) {
        return Ok(release.to_string());
    }

    let vars = TemplateVars {
        project: &config.project,
        env,
        namespace: Some(namespace),
    };
    render_name(
        "release",
        config.deploy.release.as_deref(),
        config.deploy.release_slug,
        vars,
        RELEASE_MAX_LEN,
    )
}

fn render_name(
    kind: &str,
    template: Option<&str>,
    slug: Option<bool>,
    vars: TemplateVars<'_>,
    max_len: usize,
) -> anyhow::Result<String> {
    let (template, slug) = match template.filter(|t| !t.is_empty()) {
        Some(template) => (template, slug.unwrap_or(true)),
        None if vars.env.is_some_and(|e| !e.is_empty()) => (TEMPLATE_WITH_ENV, true),
        None => (TEMPLATE_WITHOUT_ENV, true),
    };

    let rendered = template::render(kind, template, vars)?;
    if rendered.is_empty() {
        anyhow::bail!("{} rendered to an empty string from template {:?}", kind, template);
    }

    if slug {
        Ok(slug::slugify(&rendered, max_len))
    } else {
        slug::validate(kind, &rendered, max_len)?;
        Ok(rendered)
    }
}
