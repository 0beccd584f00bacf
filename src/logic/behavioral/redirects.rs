//! Redirect Chain Analysis
//!
//! Pure, side-effect-free. Accumulates an additive risk score from
//! independent conditions, capped at 1.0.

use std::collections::HashSet;

use crate::logic::patterns::{urls, CompiledLibrary};

use super::rules::{
    REDIRECT_BAD_TLD_RISK, REDIRECT_DOWNGRADE_RISK, REDIRECT_IP_HOP_RISK,
    REDIRECT_LONG_CHAIN_RISK, REDIRECT_MANY_HOSTS_RISK, REDIRECT_MAX_HOSTS,
    REDIRECT_SUSPICIOUS_THRESHOLD,
};
use super::types::RedirectAnalysis;

/// Score a redirect chain (ordered page URLs, first = origin).
pub fn analyze_redirect_chain(
    chain: &[String],
    lib: &CompiledLibrary,
    chain_cap: usize,
) -> RedirectAnalysis {
    if chain.len() < 2 {
        return RedirectAnalysis::default();
    }

    let mut risk = 0.0f32;
    let mut reasons = Vec::new();

    if chain.len() > chain_cap {
        risk += REDIRECT_LONG_CHAIN_RISK;
        reasons.push(format!(
            "Redirect chain of {} hops exceeds cap of {}",
            chain.len(),
            chain_cap
        ));
    }

    let hosts: Vec<Option<String>> = chain.iter().map(|u| urls::extract_host(u)).collect();
    let distinct: HashSet<&str> = hosts.iter().flatten().map(|h| h.as_str()).collect();
    if distinct.len() > REDIRECT_MAX_HOSTS {
        risk += REDIRECT_MANY_HOSTS_RISK;
        reasons.push(format!("{} distinct hosts in chain", distinct.len()));
    }

    for pair in chain.windows(2) {
        if pair[0].to_lowercase().starts_with("https://")
            && pair[1].to_lowercase().starts_with("http://")
        {
            risk += REDIRECT_DOWNGRADE_RISK;
            reasons.push("HTTPS to HTTP downgrade hop".to_string());
            break;
        }
    }

    if let Some(host) = hosts
        .iter()
        .flatten()
        .find(|h| urls::is_ip_literal(h))
    {
        risk += REDIRECT_IP_HOP_RISK;
        reasons.push(format!("IP-literal hop via {}", host));
    }

    if let Some(host) = hosts
        .iter()
        .flatten()
        .find(|h| urls::has_suspicious_tld(h, &lib.suspicious_tlds))
    {
        risk += REDIRECT_BAD_TLD_RISK;
        reasons.push(format!("Suspicious TLD hop via {}", host));
    }

    let risk_score = risk.min(1.0);
    RedirectAnalysis {
        is_suspicious: risk_score >= REDIRECT_SUSPICIOUS_THRESHOLD,
        risk_score,
        reasons,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lib() -> CompiledLibrary {
        CompiledLibrary::default()
    }

    fn chain(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_downgrade_and_ip_hop_scenario() {
        let result = analyze_redirect_chain(
            &chain(&["https://a.com", "http://b.com", "http://1.2.3.4/x"]),
            &lib(),
            5,
        );
        assert!(result.is_suspicious);
        assert!(result.risk_score >= 0.3);
        assert!(result.reasons.iter().any(|r| r.contains("downgrade")));
        assert!(result.reasons.iter().any(|r| r.contains("IP-literal")));
    }

    #[test]
    fn test_short_clean_chain_is_benign() {
        let result = analyze_redirect_chain(
            &chain(&["https://a.com", "https://www.a.com"]),
            &lib(),
            5,
        );
        assert!(!result.is_suspicious);
        assert_eq!(result.risk_score, 0.0);
    }

    #[test]
    fn test_single_url_is_no_chain() {
        let result = analyze_redirect_chain(&chain(&["https://a.com"]), &lib(), 5);
        assert!(!result.is_suspicious);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_long_chain_with_many_hosts() {
        let result = analyze_redirect_chain(
            &chain(&[
                "https://a.com",
                "https://b.com",
                "https://c.com",
                "https://d.com",
                "https://e.com",
                "https://f.com",
            ]),
            &lib(),
            5,
        );
        // 6 hops > 5 cap, 6 distinct hosts > 3
        assert!(result.is_suspicious);
        assert!((result.risk_score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_risk_is_capped_at_one() {
        let result = analyze_redirect_chain(
            &chain(&[
                "https://a.com",
                "http://b.tk",
                "http://1.2.3.4/x",
                "http://c.ml",
                "http://d.ga",
                "http://e.cf",
            ]),
            &lib(),
            3,
        );
        assert!(result.risk_score <= 1.0);
        assert!(result.is_suspicious);
    }
}
