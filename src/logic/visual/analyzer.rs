//! Visual Fingerprint Analyzer
//!
//! Owns the brand database and configuration; composes fingerprinting,
//! brand-similarity matching and logo detection into one page verdict.
//! Analysis calls take read locks only; admin calls serialize on the write
//! side, so readers always observe a consistent snapshot.

use parking_lot::RwLock;

use super::brand_db::BrandDatabase;
use super::fingerprint::compute_fingerprint;
use super::logo::{detect_logos, AverageHasher, PerceptualHasher};
use super::similarity::find_similar;
use super::types::{
    BrandFingerprint, DatabaseStats, ImageBuffer, LogoDetection, PageFingerprint, PageSnapshot,
    SimilarityMatch, VisualAnalysisResult, VisualConfig,
};

/// Contribution of the best similarity match to page risk
const SIMILARITY_RISK_WEIGHT: f32 = 0.6;
/// Flat addition when any surviving match is potential phishing
const PHISHING_MATCH_RISK: f32 = 0.25;
/// Addition when a matched page also collects sensitive form data
const SENSITIVE_FORM_RISK: f32 = 0.15;

pub struct VisualAnalyzer {
    config: RwLock<VisualConfig>,
    db: RwLock<BrandDatabase>,
    hasher: Box<dyn PerceptualHasher>,
}

impl VisualAnalyzer {
    pub fn new() -> Self {
        Self::with_hasher(Box::new(AverageHasher::new()))
    }

    /// Swap in a different perceptual hashing strategy (e.g. a DCT hash);
    /// matching and confidence logic are unaffected.
    pub fn with_hasher(hasher: Box<dyn PerceptualHasher>) -> Self {
        Self {
            config: RwLock::new(VisualConfig::default()),
            db: RwLock::new(BrandDatabase::new()),
            hasher,
        }
    }

    // ── Sub-operations ───────────────────────────────────────────────────

    /// Pure fingerprint computation; independent of analyzer state.
    pub fn compute_fingerprint(&self, snapshot: &PageSnapshot) -> PageFingerprint {
        compute_fingerprint(snapshot)
    }

    pub fn find_similar_legitimate(&self, fingerprint: &PageFingerprint) -> Vec<SimilarityMatch> {
        let cfg = self.config.read().clone();
        find_similar(fingerprint, &self.db.read(), &cfg)
    }

    pub fn detect_logos(&self, image: &ImageBuffer) -> Vec<LogoDetection> {
        let cfg = self.config.read().clone();
        detect_logos(image, &self.db.read(), &cfg, self.hasher.as_ref())
    }

    // ── Composition ──────────────────────────────────────────────────────

    /// Full visual analysis of one page snapshot, optionally with a logo
    /// candidate image.
    pub fn analyze_page(
        &self,
        snapshot: &PageSnapshot,
        image: Option<&ImageBuffer>,
    ) -> VisualAnalysisResult {
        let cfg = self.config.read().clone();
        let db = self.db.read();

        let fingerprint = compute_fingerprint(snapshot);
        let matches = find_similar(&fingerprint, &db, &cfg);
        let logos = match image {
            Some(img) => detect_logos(img, &db, &cfg, self.hasher.as_ref()),
            None => Vec::new(),
        };
        drop(db);

        let mut risk_score = 0.0f32;
        let mut reasons = Vec::new();

        if let Some(best) = matches.first() {
            risk_score += best.similarity * SIMILARITY_RISK_WEIGHT;
            reasons.push(format!(
                "Page is {:.0}% structurally similar to {} ({})",
                best.similarity * 100.0,
                best.brand,
                best.legitimate_domain
            ));
            if matches.iter().any(|m| m.is_potential_phishing) {
                risk_score += PHISHING_MATCH_RISK;
                reasons.push("Brand template served from a foreign domain".to_string());
            }
            let collects_sensitive = fingerprint
                .form_fields
                .iter()
                .any(|f| f.field_type == "password" || f.autocomplete.contains("password"));
            if collects_sensitive {
                risk_score += SENSITIVE_FORM_RISK;
                reasons.push("Matched page collects sensitive form data".to_string());
            }
        }
        if let Some(best_logo) = logos.first() {
            reasons.push(format!(
                "Logo of {} detected at {:.0}% confidence",
                best_logo.brand,
                best_logo.confidence * 100.0
            ));
        }

        let risk_score = risk_score.min(1.0);
        let is_suspicious = risk_score >= cfg.suspicion_threshold;

        log::debug!(
            "Visual analysis of {}: {} matches, {} logos, risk {:.2}",
            snapshot.url,
            matches.len(),
            logos.len(),
            risk_score
        );

        VisualAnalysisResult {
            fingerprint,
            matches,
            logos,
            risk_score,
            is_suspicious,
            suspicion_reasons: reasons,
        }
    }

    // ── Brand database administration ────────────────────────────────────

    pub fn add_brand(&self, brand: BrandFingerprint) -> bool {
        self.db.write().add(brand)
    }

    pub fn remove_brand(&self, name: &str) -> Option<BrandFingerprint> {
        self.db.write().remove(name)
    }

    pub fn get_brand(&self, name: &str) -> Option<BrandFingerprint> {
        self.db.read().get(name).cloned()
    }

    pub fn database_stats(&self) -> DatabaseStats {
        self.db.read().stats()
    }

    // ── Configuration ────────────────────────────────────────────────────

    pub fn get_config(&self) -> VisualConfig {
        self.config.read().clone()
    }

    pub fn update_config(&self, config: VisualConfig) {
        let clamped = config.clamped();
        log::info!("Visual config updated");
        *self.config.write() = clamped;
    }

    pub fn reset_to_defaults(&self) {
        *self.config.write() = VisualConfig::default();
    }
}

impl Default for VisualAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"
        <html><body><header></header><main>
          <form><input type="email"><input type="password"></form>
        </main><footer></footer></body></html>
    "#;

    fn snapshot(url: &str) -> PageSnapshot {
        PageSnapshot {
            url: url.to_string(),
            title: String::new(),
            html: TEMPLATE.to_string(),
        }
    }

    fn seeded_analyzer() -> VisualAnalyzer {
        let analyzer = VisualAnalyzer::new();
        let fp = analyzer.compute_fingerprint(&snapshot("https://paybuddy.com/login"));
        analyzer.add_brand(BrandFingerprint {
            brand: "PayBuddy".to_string(),
            legitimate_domains: vec!["paybuddy.com".to_string()],
            dom_hashes: vec![fp.dom_structure_hash],
            css_hashes: vec![fp.css_pattern_hash],
            layout_hashes: vec![fp.layout_hash],
            ..Default::default()
        });
        analyzer
    }

    #[test]
    fn test_clone_on_foreign_domain_is_suspicious() {
        let analyzer = seeded_analyzer();
        let result = analyzer.analyze_page(&snapshot("https://evil.tk/login"), None);
        assert!(!result.matches.is_empty());
        assert!(result.is_suspicious);
        // similarity 1.0 * 0.6 + 0.25 phishing + 0.15 sensitive form
        assert!((result.risk_score - 1.0).abs() < 1e-6);
        assert!(result
            .suspicion_reasons
            .iter()
            .any(|r| r.contains("foreign domain")));
    }

    #[test]
    fn test_own_domain_is_never_suspicious() {
        let analyzer = seeded_analyzer();
        let result = analyzer.analyze_page(&snapshot("https://paybuddy.com/login"), None);
        assert!(result.matches.is_empty());
        assert!(!result.is_suspicious);
        assert_eq!(result.risk_score, 0.0);
    }

    #[test]
    fn test_brand_admin_roundtrip() {
        let analyzer = seeded_analyzer();
        assert!(analyzer.get_brand("PayBuddy").is_some());
        assert_eq!(analyzer.database_stats().brand_count, 1);
        assert!(analyzer.remove_brand("PayBuddy").is_some());
        assert!(analyzer.get_brand("PayBuddy").is_none());
    }

    #[test]
    fn test_config_clamped_on_write() {
        let analyzer = VisualAnalyzer::new();
        let mut cfg = analyzer.get_config();
        cfg.similarity_threshold = 3.0;
        cfg.max_matches = 0;
        analyzer.update_config(cfg);
        let cfg = analyzer.get_config();
        assert!(cfg.similarity_threshold <= 1.0);
        assert_eq!(cfg.max_matches, 1);
    }
}
