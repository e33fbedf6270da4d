use once_cell::sync::Lazy;
use regex::Regex;

// ── Lazy static regexes ──────────────────────────────────────────────────────

static SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());

// Deliberately loose: consecutive dots or edge hyphens still pass.
static HOSTNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(?:/.*)?$").unwrap());

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Domain parameter is required")]
    MissingParameter,
    #[error("Invalid domain format provided")]
    InvalidFormat,
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Validates the raw `domain` query value and returns the absolute URL to
/// analyze. An empty value counts as missing.
pub fn validate_domain(raw: Option<&str>) -> Result<String, InputError> {
    let domain = match raw {
        Some(d) if !d.is_empty() => d,
        _ => return Err(InputError::MissingParameter),
    };

    let bare = SCHEME_RE.replace(domain, "");
    if !HOSTNAME_RE.is_match(&bare) {
        return Err(InputError::InvalidFormat);
    }

    Ok(normalize_url(domain))
}

fn normalize_url(domain: &str) -> String {
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_is_missing_parameter() {
        assert_eq!(validate_domain(None), Err(InputError::MissingParameter));
        assert_eq!(validate_domain(Some("")), Err(InputError::MissingParameter));
    }

    #[test]
    fn bare_domain_gets_https_prefix() {
        assert_eq!(
            validate_domain(Some("example.com")).unwrap(),
            "https://example.com"
        );
        assert_eq!(
            validate_domain(Some("shop.example.co.uk/collections/all")).unwrap(),
            "https://shop.example.co.uk/collections/all"
        );
    }

    #[test]
    fn existing_scheme_is_kept_verbatim() {
        for input in [
            "http://example.com",
            "https://example.com",
            "https://my-store.io/path?q=1",
        ] {
            assert_eq!(validate_domain(Some(input)).unwrap(), input);
        }
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "not a domain",
            "localhost",
            "example.c",
            "example.123",
            "ftp://example.com",
            "https://",
            "exa mple.com",
            "example.com?x=1",
        ] {
            assert_eq!(
                validate_domain(Some(input)),
                Err(InputError::InvalidFormat),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn pattern_stays_permissive() {
        assert!(validate_domain(Some("a..b.com")).is_ok());
        assert!(validate_domain(Some("-shop-.com")).is_ok());
    }

    #[test]
    fn error_messages_match_the_wire_contract() {
        assert_eq!(
            InputError::MissingParameter.to_string(),
            "Domain parameter is required"
        );
        assert_eq!(
            InputError::InvalidFormat.to_string(),
            "Invalid domain format provided"
        );
    }
}
