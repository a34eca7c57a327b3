//! Kubernetes-safe names for namespaces and releases.

pub const NAMESPACE_MAX_LEN: usize = 63;
pub const RELEASE_MAX_LEN: usize = 53;

const HASH_LEN: usize = 8;

/// Lowercase alphanumerics separated by single dashes, within `max_len`.
pub fn is_valid(value: &str, max_len: usize) -> bool {
    !value.is_empty()
        && value.len() <= max_len
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Turn `value` into a valid name.
///
/// Valid input is returned unchanged. Anything else is normalized and suffixed
/// with a short hash of the original so distinct inputs stay distinct.
pub fn slugify(value: &str, max_len: usize) -> String {
    if is_valid(value, max_len) {
        return value.to_string();
    }

    let mut body = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            body.push(c.to_ascii_lowercase());
        } else if !body.ends_with('-') {
            body.push('-');
        }
    }

    let hex = blake3::hash(value.as_bytes()).to_hex();
    let hash = &hex.as_str()[..HASH_LEN];

    let max_body = max_len.saturating_sub(HASH_LEN + 1);
    let body = body.trim_matches('-');
    let body = body[..body.len().min(max_body)].trim_end_matches('-');
    if body.is_empty() {
        hash.to_string()
    } else {
        format!("{body}-{hash}")
    }
}

pub fn validate(kind: &str, value: &str, max_len: usize) -> anyhow::Result<()> {
    if is_valid(value, max_len) {
        return Ok(());
    }
    anyhow::bail!(
        "{} {:?} is not valid: expected at most {} lowercase alphanumeric characters or '-', \
         starting and ending with an alphanumeric character",
        kind,
        value,
        max_len
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names_are_unchanged() {
        assert_eq!(slugify("web-prod", NAMESPACE_MAX_LEN), "web-prod");
        assert_eq!(slugify("a1", RELEASE_MAX_LEN), "a1");
    }

    #[test]
    fn invalid_names_get_hash_suffix() {
        let slug = slugify("Web_Prod", NAMESPACE_MAX_LEN);
        assert!(slug.starts_with("web-prod-"), "{slug}");
        assert_eq!(slug.len(), "web-prod-".len() + HASH_LEN);
        assert!(is_valid(&slug, NAMESPACE_MAX_LEN));
    }

    #[test]
    fn distinct_inputs_stay_distinct() {
        assert_ne!(
            slugify("Web_Prod", NAMESPACE_MAX_LEN),
            slugify("web.prod", NAMESPACE_MAX_LEN)
        );
    }

    #[test]
    fn long_names_are_truncated_to_limit() {
        let long = "x".repeat(80);
        let slug = slugify(&long, RELEASE_MAX_LEN);
        assert_eq!(slug.len(), RELEASE_MAX_LEN);
        assert!(is_valid(&slug, RELEASE_MAX_LEN));
    }

    #[test]
    fn symbols_only_collapse_to_hash() {
        let slug = slugify("___", NAMESPACE_MAX_LEN);
        assert_eq!(slug.len(), HASH_LEN);
        assert!(is_valid(&slug, NAMESPACE_MAX_LEN));
    }

    #[test]
    fn validate_reports_kind() {
        let err = validate("namespace", "Bad", NAMESPACE_MAX_LEN).unwrap_err();
        assert!(err.to_string().contains("namespace \"Bad\""));
    }
}
