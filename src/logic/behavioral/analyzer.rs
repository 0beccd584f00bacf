//! Behavioral Analyzer
//!
//! Combines the script detectors, form analysis and redirect-chain scoring
//! into one page-level verdict. Sub-detector failures are isolated: one
//! family finding nothing (or being skipped over a bad rule) never aborts
//! its siblings, and absence of evidence is a valid zero-pattern result.

use parking_lot::RwLock;

use crate::logic::patterns::{CompiledLibrary, PatternLibrary};

use super::rules::{BehaviorConfig, EXCESSIVE_PERMISSIONS_MIN, SCRIPT_LAYER_WEIGHT, SUSPICIOUS_FORM_WEIGHT};
use super::scripts::analyze_scripts;
use super::types::{
    BehaviorPattern, BehaviorPatternKind, BehaviorResult, PageContext, RedirectAnalysis,
    ScriptAnalysis,
};
use super::{forms, redirects};

pub struct BehavioralAnalyzer {
    config: RwLock<BehaviorConfig>,
    library: CompiledLibrary,
}

impl BehavioralAnalyzer {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(BehaviorConfig::default()),
            library: CompiledLibrary::default(),
        }
    }

    /// Build against a custom (e.g. updated-over-the-wire) pattern library.
    pub fn with_library(library: &PatternLibrary) -> Self {
        Self {
            config: RwLock::new(BehaviorConfig::default()),
            library: CompiledLibrary::compile(library),
        }
    }

    // ── Analysis ─────────────────────────────────────────────────────────

    /// Full behavioral analysis of one page event.
    pub fn analyze(&self, page: &PageContext) -> BehaviorResult {
        // Snapshot the config once; admin writes never tear a running call
        let cfg = self.config.read().clone();

        let script_analysis = analyze_scripts(&page.scripts, &self.library, &cfg);
        let form_targets = forms::analyze_forms(&page.url, &page.forms, &self.library);
        let redirect =
            redirects::analyze_redirect_chain(&page.redirect_chain, &self.library, cfg.redirect_chain_cap);

        let mut patterns = script_analysis.patterns.clone();
        if let Some(p) = redirect_pattern(&redirect) {
            patterns.push(p);
        }
        if let Some(p) = self.permission_pattern(&page.permissions, &cfg) {
            patterns.push(p);
        }

        let suspicious_forms = form_targets.iter().filter(|f| f.is_suspicious).count();
        let pattern_score: f32 = patterns
            .iter()
            .map(|p| p.confidence * p.severity.weight())
            .sum();
        let risk_score = (pattern_score
            + SUSPICIOUS_FORM_WEIGHT * suspicious_forms as f32
            + SCRIPT_LAYER_WEIGHT * script_analysis.risk_score)
            .min(1.0);

        log::debug!(
            "Behavioral analysis of {}: {} patterns, {} suspicious forms, risk {:.2}",
            page.url,
            patterns.len(),
            suspicious_forms,
            risk_score
        );

        BehaviorResult {
            patterns,
            forms: form_targets,
            redirect,
            risk_score,
        }
    }

    /// Script-only building block (decomposable per the layer contract).
    pub fn analyze_scripts(&self, scripts: &[String]) -> ScriptAnalysis {
        let cfg = self.config.read().clone();
        analyze_scripts(scripts, &self.library, &cfg)
    }

    /// Redirect-chain building block, pure and side-effect-free.
    pub fn analyze_redirect_chain(&self, chain: &[String]) -> RedirectAnalysis {
        let cap = self.config.read().redirect_chain_cap;
        redirects::analyze_redirect_chain(chain, &self.library, cap)
    }

    fn permission_pattern(
        &self,
        permissions: &[String],
        cfg: &BehaviorConfig,
    ) -> Option<BehaviorPattern> {
        let sensitive = permissions
            .iter()
            .filter(|p| {
                self.library
                    .sensitive_permissions
                    .contains(&p.to_lowercase())
            })
            .count();
        if sensitive < EXCESSIVE_PERMISSIONS_MIN {
            return None;
        }
        let kind = BehaviorPatternKind::ExcessivePermissions;
        Some(BehaviorPattern {
            kind,
            confidence: cfg.excessive_permissions.confidence(sensitive),
            severity: kind.severity(),
            evidence: format!("{} sensitive permissions requested", sensitive),
        })
    }

    // ── Configuration ────────────────────────────────────────────────────

    pub fn get_config(&self) -> BehaviorConfig {
        self.config.read().clone()
    }

    pub fn update_config(&self, config: BehaviorConfig) {
        let clamped = config.clamped();
        log::info!("Behavioral config updated");
        *self.config.write() = clamped;
    }

    pub fn reset_to_defaults(&self) {
        *self.config.write() = BehaviorConfig::default();
    }
}

impl Default for BehavioralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn redirect_pattern(redirect: &RedirectAnalysis) -> Option<BehaviorPattern> {
    if !redirect.is_suspicious {
        return None;
    }
    let kind = BehaviorPatternKind::SuspiciousRedirect;
    Some(BehaviorPattern {
        kind,
        confidence: redirect.risk_score,
        severity: kind.severity(),
        evidence: redirect.reasons.join("; "),
    })
}

// ============================================================================
// TESTS
// ============================================================================
