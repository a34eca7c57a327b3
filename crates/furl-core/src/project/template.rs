//! `[[ var ]]` placeholders in deploy naming templates.

const OPEN: &str = "[[";
const CLOSE: &str = "]]";
const KNOWN_VARS: [&str; 3] = ["project", "env", "namespace"];

/// Values available while rendering one template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub project: &'a str,
    pub env: Option<&'a str>,
    /// Only set for the release template.
    pub namespace: Option<&'a str>,
}

/// Render `template`; `name` identifies the value being built in errors.
pub fn render(name: &str, template: &str, vars: TemplateVars<'_>) -> anyhow::Result<String> {
    let mut out = String::with_capacity(template.len());
    for piece in pieces(template)? {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Var("project") => out.push_str(vars.project),
            Piece::Var("env") => match vars.env {
                Some(env) if !env.is_empty() => out.push_str(env),
                _ => anyhow::bail!(
                    "--env option or $FURL_ENV variable required to construct the {}",
                    name
                ),
            },
            Piece::Var("namespace") => match vars.namespace {
                Some(namespace) => out.push_str(namespace),
                None => anyhow::bail!("[[ namespace ]] is not available in the {} template", name),
            },
            Piece::Var(other) => anyhow::bail!("unknown template variable '{}'", other),
        }
    }
    Ok(out)
}

/// Validate placeholders without rendering.
pub fn check_syntax(template: &str) -> anyhow::Result<()> {
    for piece in pieces(template)? {
        let Piece::Var(var) = piece else {
            continue;
        };
        if !KNOWN_VARS.contains(&var) {
            anyhow::bail!(
                "unknown template variable '{}' (expected one of: {})",
                var,
                KNOWN_VARS.join(", ")
            );
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Var(&'a str),
}

fn pieces(template: &str) -> anyhow::Result<Vec<Piece<'_>>> {
    let mut pieces = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            pieces.push(Piece::Text(&rest[..start]));
        }
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open
            .find(CLOSE)
            .ok_or_else(|| anyhow::anyhow!("unclosed '{}' in template '{}'", OPEN, template))?;
        let var = after_open[..end].trim();
        if var.is_empty() {
            anyhow::bail!("empty placeholder in template '{}'", template);
        }
        pieces.push(Piece::Var(var));
        rest = &after_open[end + CLOSE.len()..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(env: Option<&'a str>, namespace: Option<&'a str>) -> TemplateVars<'a> {
        TemplateVars {
            project: "web",
            env,
            namespace,
        }
    }

    #[test]
    fn renders_all_variables() {
        let out = render(
            "release",
            "[[project]]-[[ env ]]@[[  namespace ]]",
            vars(Some("prod"), Some("team")),
        )
        .unwrap();
        assert_eq!(out, "web-prod@team");
    }

    #[test]
    fn plain_text_is_kept() {
        assert_eq!(render("namespace", "static", vars(None, None)).unwrap(), "static");
    }

    #[test]
    fn env_is_required_when_referenced() {
        let err = render("namespace", "[[ project ]]-[[ env ]]", vars(None, None)).unwrap_err();
        assert!(err.to_string().contains("--env"));
        assert!(err.to_string().contains("namespace"));
    }

    #[test]
    fn namespace_unavailable_in_namespace_template() {
        let err = render("namespace", "[[ namespace ]]", vars(None, None)).unwrap_err();
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn unclosed_placeholder_is_an_error() {
        assert!(check_syntax("[[ project").is_err());
        assert!(check_syntax("[[ ]]").is_err());
        assert!(check_syntax("[[ nope ]]").is_err());
        assert!(check_syntax("[[ project ]]-x").is_ok());
    }
}
