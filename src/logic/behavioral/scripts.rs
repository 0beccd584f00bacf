//! Script Detectors
//!
//! Each detector family scans raw script text with its rule set and only
//! emits a finding once its corroboration minimum is met:
//! - keylogger: >= 2 independent matching rules
//! - clipboard hijack: a write rule AND (a read rule OR a crypto literal),
//!   so a legitimate copy button never trips it
//! - fake alert: >= 2 independent matching rules
//! - obfuscation: >= 2 accumulated indicators on the same script
//! - crypto swap: address literal + clipboard access + string replace near
//!   the literal, all three at once

use crate::logic::patterns::CompiledLibrary;

use super::rules::{
    BehaviorConfig, FAKE_ALERT_MIN_MATCHES, KEYLOGGER_MIN_MATCHES, OBFUSCATION_MIN_INDICATORS,
};
use super::types::{BehaviorPattern, BehaviorPatternKind, ObfuscationIndicator, ScriptAnalysis};

/// Maximum distance (bytes) between an address literal and a replace call
/// for the crypto-swap proximity condition
const SWAP_PROXIMITY: usize = 400;

// ============================================================================
// PER-FAMILY DETECTORS
// ============================================================================

fn make_pattern(kind: BehaviorPatternKind, confidence: f32, evidence: Vec<String>) -> BehaviorPattern {
    BehaviorPattern {
        kind,
        confidence,
        severity: kind.severity(),
        evidence: evidence.join("; "),
    }
}

/// Key-capture detection. Requires multiple independent rules so that a lone
/// `keydown` listener (ubiquitous in benign pages) stays below threshold.
pub fn detect_keylogger(
    script: &str,
    lib: &CompiledLibrary,
    cfg: &BehaviorConfig,
) -> Option<BehaviorPattern> {
    let matched: Vec<&str> = lib
        .keylogger
        .iter()
        .filter(|r| r.regex.is_match(script))
        .map(|r| r.description.as_str())
        .collect();

    if matched.len() < KEYLOGGER_MIN_MATCHES {
        return None;
    }
    Some(make_pattern(
        BehaviorPatternKind::Keylogger,
        cfg.keylogger.confidence(matched.len()),
        matched.iter().map(|s| s.to_string()).collect(),
    ))
}

/// Clipboard hijack detection. Write access alone is what every copy button
/// does, so a write rule must be corroborated by read access or a hardcoded
/// cryptocurrency address.
pub fn detect_clipboard_hijack(
    script: &str,
    lib: &CompiledLibrary,
    cfg: &BehaviorConfig,
) -> Option<BehaviorPattern> {
    let writes: Vec<&str> = lib
        .clipboard_write
        .iter()
        .filter(|r| r.regex.is_match(script))
        .map(|r| r.description.as_str())
        .collect();
    if writes.is_empty() {
        return None;
    }

    let reads: Vec<&str> = lib
        .clipboard_read
        .iter()
        .filter(|r| r.regex.is_match(script))
        .map(|r| r.description.as_str())
        .collect();
    let addresses: Vec<&str> = lib
        .crypto_address
        .iter()
        .filter(|r| r.regex.is_match(script))
        .map(|r| r.description.as_str())
        .collect();

    if reads.is_empty() && addresses.is_empty() {
        return None;
    }

    let mut evidence: Vec<String> = Vec::new();
    evidence.extend(writes.iter().map(|s| s.to_string()));
    evidence.extend(reads.iter().map(|s| s.to_string()));
    evidence.extend(addresses.iter().map(|s| s.to_string()));
    let count = writes.len() + reads.len() + addresses.len();

    Some(make_pattern(
        BehaviorPatternKind::ClipboardHijack,
        cfg.clipboard_hijack.confidence(count),
        evidence,
    ))
}

/// Scareware / tech-support-bait phrasing detection.
pub fn detect_fake_alert(
    script: &str,
    lib: &CompiledLibrary,
    cfg: &BehaviorConfig,
) -> Option<BehaviorPattern> {
    let matched: Vec<&str> = lib
        .fake_alert
        .iter()
        .filter(|r| r.regex.is_match(script))
        .map(|r| r.description.as_str())
        .collect();

    if matched.len() < FAKE_ALERT_MIN_MATCHES {
        return None;
    }
    Some(make_pattern(
        BehaviorPatternKind::FakeAlert,
        cfg.fake_alert.confidence(matched.len()),
        matched.iter().map(|s| s.to_string()).collect(),
    ))
}

/// Obfuscation indicators accumulate per script; two or more promote to one
/// `ObfuscatedJs` pattern whose confidence grows with indicator count.
pub fn detect_obfuscation(
    script: &str,
    lib: &CompiledLibrary,
    cfg: &BehaviorConfig,
) -> (Vec<ObfuscationIndicator>, Option<BehaviorPattern>) {
    let mut indicators = Vec::new();

    for rule in &lib.obfuscation {
        let hits = rule.regex.find_iter(script).count();
        if hits >= rule.min_hits {
            // Saturates at twice the rule's density floor
            let confidence = (hits as f32 / (rule.min_hits as f32 * 2.0)).min(1.0);
            indicators.push(ObfuscationIndicator {
                id: rule.id.clone(),
                confidence,
                evidence: format!("{} ({} hits)", rule.description, hits),
            });
        }
    }

    if indicators.len() < OBFUSCATION_MIN_INDICATORS {
        return (indicators, None);
    }

    let evidence: Vec<String> = indicators.iter().map(|i| i.evidence.clone()).collect();
    let pattern = make_pattern(
        BehaviorPatternKind::ObfuscatedJs,
        cfg.obfuscation.confidence(indicators.len()),
        evidence,
    );
    (indicators, Some(pattern))
}

/// Crypto-address swap detection: a recognized address literal, clipboard
/// access, and a string-replace call within `SWAP_PROXIMITY` bytes of an
/// address literal. All three together are unlikely in legitimate code.
pub fn detect_crypto_swap(
    script: &str,
    lib: &CompiledLibrary,
    cfg: &BehaviorConfig,
) -> Option<BehaviorPattern> {
    let address_spans: Vec<(usize, &str)> = lib
        .crypto_address
        .iter()
        .flat_map(|r| {
            let desc = r.description.as_str();
            r.regex.find_iter(script).map(move |m| (m.start(), desc))
        })
        .collect();
    if address_spans.is_empty() {
        return None;
    }

    let clipboard_access = lib
        .clipboard_write
        .iter()
        .chain(lib.clipboard_read.iter())
        .any(|r| r.regex.is_match(script));
    if !clipboard_access {
        return None;
    }

    let replace = lib.replace_call.as_ref()?;
    let near_address = replace.find_iter(script).any(|m| {
        address_spans
            .iter()
            .any(|(pos, _)| m.start().abs_diff(*pos) <= SWAP_PROXIMITY)
    });
    if !near_address {
        return None;
    }

    let formats: Vec<String> = address_spans
        .iter()
        .map(|(_, desc)| desc.to_string())
        .collect();
    let mut evidence = vec!["Clipboard access".to_string(), "Replace call near address literal".to_string()];
    evidence.extend(formats);
    evidence.dedup();

    Some(make_pattern(
        BehaviorPatternKind::CryptoSwap,
        cfg.crypto_swap_confidence,
        evidence,
    ))
}

// ============================================================================
// SCRIPT-LAYER AGGREGATION
// ============================================================================

/// Run every detector family over every script body. Families are
/// independent; a finding in one never suppresses another.
pub fn analyze_scripts(
    scripts: &[String],
    lib: &CompiledLibrary,
    cfg: &BehaviorConfig,
) -> ScriptAnalysis {
    let mut patterns = Vec::new();

    for script in scripts {
        if script.is_empty() {
            continue;
        }
        if let Some(p) = detect_keylogger(script, lib, cfg) {
            patterns.push(p);
        }
        if let Some(p) = detect_clipboard_hijack(script, lib, cfg) {
            patterns.push(p);
        }
        if let Some(p) = detect_fake_alert(script, lib, cfg) {
            patterns.push(p);
        }
        let (_, obfuscated) = detect_obfuscation(script, lib, cfg);
        if let Some(p) = obfuscated {
            patterns.push(p);
        }
        if let Some(p) = detect_crypto_swap(script, lib, cfg) {
            patterns.push(p);
        }
    }

    let risk_score = patterns
        .iter()
        .map(|p| p.confidence * p.severity.weight())
        .sum::<f32>()
        .min(1.0);

    ScriptAnalysis {
        patterns,
        risk_score,
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

    fn cfg() -> BehaviorConfig {
        BehaviorConfig::default()
    }

    #[test]
    fn test_single_keylogger_match_is_not_enough() {
        // One ubiquitous listener: evidence, not a verdict
        let script = r#"document.addEventListener('keydown', handleShortcut);"#.to_string();
        let result = analyze_scripts(&[script], &lib(), &cfg());
        assert!(result
            .patterns
            .iter()
            .all(|p| p.kind != BehaviorPatternKind::Keylogger));
    }

    #[test]
    fn test_two_keylogger_matches_produce_one_pattern() {
        let script = r#"
            document.addEventListener('keydown', function(e) {
                keys += e.key;
            });
        "#
        .to_string();
        let result = analyze_scripts(&[script], &lib(), &cfg());
        let hits: Vec<_> = result
            .patterns
            .iter()
            .filter(|p| p.kind == BehaviorPatternKind::Keylogger)
            .collect();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].confidence >= 0.35);
        assert!(hits[0].confidence <= 0.9);
    }

    #[test]
    fn test_legitimate_copy_button_not_flagged() {
        let script = r#"
            copyBtn.onclick = () => navigator.clipboard.writeText(link.href);
        "#
        .to_string();
        let result = analyze_scripts(&[script], &lib(), &cfg());
        assert!(result.patterns.is_empty());
    }

    #[test]
    fn test_clipboard_read_plus_write_is_hijack() {
        let script = r#"
            document.addEventListener('paste', async () => {
                const text = await navigator.clipboard.readText();
                navigator.clipboard.writeText(rewrite(text));
            });
        "#
        .to_string();
        let result = analyze_scripts(&[script], &lib(), &cfg());
        assert!(result
            .patterns
            .iter()
            .any(|p| p.kind == BehaviorPatternKind::ClipboardHijack));
    }

    #[test]
    fn test_crypto_swap_needs_all_three_conditions() {
        let l = lib();
        let c = cfg();
        // Address + clipboard, no replace call near it
        let without_replace = r#"
            const donation = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
            navigator.clipboard.writeText(donation);
        "#;
        assert!(detect_crypto_swap(without_replace, &l, &c).is_none());

        // All three at once
        let full = r#"
            const attacker = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
            navigator.clipboard.readText().then(t => {
                navigator.clipboard.writeText(t.replace(/\b[13][a-zA-Z0-9]{25,34}\b/, attacker));
            });
        "#;
        let pattern = detect_crypto_swap(full, &l, &c).expect("swap pattern");
        assert_eq!(pattern.severity, crate::logic::behavioral::Severity::Critical);
        assert!((pattern.confidence - c.crypto_swap_confidence).abs() < f32::EPSILON);
    }

    #[test]
    fn test_obfuscation_promotion_requires_two_indicators() {
        let l = lib();
        let c = cfg();
        // eval alone: one indicator, no promotion
        let (indicators, pattern) = detect_obfuscation("eval(code);", &l, &c);
        assert_eq!(indicators.len(), 1);
        assert!(pattern.is_none());

        // eval + atob: promoted
        let (indicators, pattern) = detect_obfuscation("eval(atob(payload));", &l, &c);
        assert!(indicators.len() >= 2);
        let pattern = pattern.expect("obfuscation pattern");
        assert_eq!(pattern.kind, BehaviorPatternKind::ObfuscatedJs);
    }

    #[test]
    fn test_obfuscation_confidence_grows_with_indicators() {
        let l = lib();
        let c = cfg();
        let (_, two) = detect_obfuscation("eval(atob(x));", &l, &c);
        let (_, three) = detect_obfuscation("eval(atob(new Function(x)));", &l, &c);
        assert!(three.unwrap().confidence > two.unwrap().confidence);
    }

    #[test]
    fn test_fake_alert_corroboration() {
        let l = lib();
        let c = cfg();
        let one = "alert('VIRUS DETECTED');";
        assert!(detect_fake_alert(one, &l, &c).is_none());

        let two = "Your computer is infected! VIRUS DETECTED. Do not close this window.";
        let p = detect_fake_alert(two, &l, &c).expect("fake alert pattern");
        assert!(p.confidence >= 0.4);
    }

    #[test]
    fn test_empty_scripts_yield_empty_result() {
        let result = analyze_scripts(&[], &lib(), &cfg());
        assert!(result.patterns.is_empty());
        assert_eq!(result.risk_score, 0.0);
    }
}
