//! URL Helpers
//!
//! Small, allocation-light host extraction and host classification used by
//! both the behavioral and visual layers. No networking, no normalization
//! beyond what scoring needs.

use once_cell::sync::Lazy;
use regex::Regex;

static IP_LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("static regex"));

/// Extract the host portion of a URL, lowercased. Strips scheme, credentials,
/// port and path. Returns `None` for schemes without a host (data:, javascript:).
pub fn extract_host(url: &str) -> Option<String> {
    let lower = url.trim().to_lowercase();
    if lower.starts_with("data:") || lower.starts_with("javascript:") || lower.starts_with("blob:")
    {
        return None;
    }
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let host = without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .split('@')
        .last()
        .unwrap_or(without_scheme)
        .split(':')
        .next()
        .unwrap_or(without_scheme);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// IPv4 literal host check.
pub fn is_ip_literal(host: &str) -> bool {
    IP_LITERAL_RE.is_match(host)
}

/// Whether the host ends in one of the given (lowercased) TLDs.
pub fn has_suspicious_tld(host: &str, tlds: &[String]) -> bool {
    match host.rsplit('.').next() {
        Some(tld) => tlds.iter().any(|t| t == tld),
        None => false,
    }
}

/// Whether `host` is `domain` itself or a subdomain of it.
pub fn is_same_or_subdomain(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_host_strips_scheme_port_path() {
        assert_eq!(
            extract_host("https://Login.Example.com:8443/a/b?c=d"),
            Some("login.example.com".to_string())
        );
        assert_eq!(
            extract_host("http://user:pw@evil.tk/x"),
            Some("evil.tk".to_string())
        );
    }

    #[test]
    fn test_extract_host_rejects_opaque_schemes() {
        assert_eq!(extract_host("data:text/html,<h1>x</h1>"), None);
        assert_eq!(extract_host("javascript:alert(1)"), None);
    }

    #[test]
    fn test_ip_literal() {
        assert!(is_ip_literal("1.2.3.4"));
        assert!(!is_ip_literal("example.com"));
    }

    #[test]
    fn test_subdomain_check() {
        assert!(is_same_or_subdomain("login.paypal.com", "paypal.com"));
        assert!(is_same_or_subdomain("paypal.com", "paypal.com"));
        assert!(!is_same_or_subdomain("paypal.com.evil.tk", "paypal.com"));
    }
}
