//! Detection Pipeline
//!
//! Wires the behavioral analyzer, the visual fingerprint analyzer, and the
//! fusion engine into one scan entry point.
//!
//! Components:
//! - Layer result -> `DetectionSignal` conversions
//! - `DetectionPipeline`: one scan call per page event
//!
//! External layers (URL reputation, an ML model) hand their signals in
//! through `scan`; the pipeline itself owns only the local analyzers.

use serde_json::json;

use super::behavioral::{BehaviorResult, BehavioralAnalyzer, PageContext};
use super::fusion::{DetectionSignal, FusionEngine, FusionResult, SignalSource};
use super::visual::{ImageBuffer, PageSnapshot, VisualAnalysisResult, VisualAnalyzer};

// ============================================================================
// SIGNAL CONVERSIONS
// ============================================================================

impl BehaviorResult {
    /// Condense this result into one fusion signal. Quiet pages (zero risk,
    /// no patterns) produce nothing rather than a zero-score signal.
    pub fn to_signal(&self) -> Option<DetectionSignal> {
        if self.risk_score <= 0.0 && self.patterns.is_empty() {
            return None;
        }
        let strongest = self.patterns.iter().max_by(|a, b| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let name = strongest
            .map(|p| p.kind.as_str())
            .unwrap_or("behavioral_risk");
        let mut signal = DetectionSignal::new(SignalSource::Behavioral, name, self.risk_score)
            .with_details(json!({
                "patterns": self
                    .patterns
                    .iter()
                    .map(|p| p.kind.as_str())
                    .collect::<Vec<_>>(),
                "suspicious_forms": self.forms.iter().filter(|f| f.is_suspicious).count(),
            }));
        if let Some(pattern) = strongest {
            signal = signal.with_confidence(pattern.confidence);
        }
        Some(signal)
    }
}

impl VisualAnalysisResult {
    /// Condense this result into one fusion signal. Pages that match no
    /// brand and carry no detected logo produce nothing.
    pub fn to_signal(&self) -> Option<DetectionSignal> {
        if self.matches.is_empty() && self.logos.is_empty() {
            return None;
        }
        let best = self.matches.first();
        let name = best.map(|_| "brand_similarity").unwrap_or("logo_detected");
        let mut signal =
            DetectionSignal::new(SignalSource::VisualFingerprint, name, self.risk_score)
                .with_details(json!({
                    "matches": self
                        .matches
                        .iter()
                        .map(|m| m.brand.as_str())
                        .collect::<Vec<_>>(),
                    "reasons": self.suspicion_reasons,
                }));
        if let Some(m) = best {
            signal = signal.with_confidence(m.similarity);
        }
        Some(signal)
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct DetectionPipeline {
    behavioral: BehavioralAnalyzer,
    visual: VisualAnalyzer,
    fusion: FusionEngine,
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionPipeline {
    pub fn new() -> Self {
        Self {
            behavioral: BehavioralAnalyzer::new(),
            visual: VisualAnalyzer::new(),
            fusion: FusionEngine::new(),
        }
    }

    /// Run both local layers on one page event, merge in any externally
    /// produced signals, and fuse everything into a single verdict.
    pub fn scan(
        &self,
        page: &PageContext,
        snapshot: &PageSnapshot,
        image: Option<&ImageBuffer>,
        external_signals: &[DetectionSignal],
    ) -> FusionResult {
        let behavior = self.behavioral.analyze(page);
        let visual = self.visual.analyze_page(snapshot, image);

        let mut signals: Vec<DetectionSignal> = external_signals.to_vec();
        if let Some(signal) = behavior.to_signal() {
            signals.push(signal);
        }
        if let Some(signal) = visual.to_signal() {
            signals.push(signal);
        }

        let result = self.fusion.fuse_signals(&signals);
        log::info!(
            "Scan of {}: {} at {}% confidence ({} signals)",
            page.url,
            result.risk_level,
            result.confidence,
            signals.len()
        );
        result
    }

    // Layer access for administration (brand database, rule tuning)

    pub fn behavioral(&self) -> &BehavioralAnalyzer {
        &self.behavioral
    }

    pub fn visual(&self) -> &VisualAnalyzer {
        &self.visual
    }

    pub fn fusion(&self) -> &FusionEngine {
        &self.fusion
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fusion::RiskLevel;
    use crate::logic::visual::BrandFingerprint;

    const CLONE_TEMPLATE: &str = r#"
        <html><body><header></header><main>
          <form><input type="email"><input type="password"></form>
        </main><footer></footer></body></html>
    "#;

    fn page(url: &str, scripts: Vec<String>) -> PageContext {
        PageContext {
            url: url.to_string(),
            scripts,
            ..Default::default()
        }
    }

    fn snapshot(url: &str) -> PageSnapshot {
        PageSnapshot {
            url: url.to_string(),
            title: String::new(),
            html: CLONE_TEMPLATE.to_string(),
        }
    }

    fn seeded_pipeline() -> DetectionPipeline {
        let _ = env_logger::builder().is_test(true).try_init();
        let pipeline = DetectionPipeline::new();
        let fp = pipeline
            .visual()
            .compute_fingerprint(&snapshot("https://paybuddy.com/login"));
        assert!(pipeline.visual().add_brand(BrandFingerprint {
            brand: "PayBuddy".to_string(),
            legitimate_domains: vec!["paybuddy.com".to_string()],
            dom_hashes: vec![fp.dom_structure_hash],
            css_hashes: vec![fp.css_pattern_hash],
            layout_hashes: vec![fp.layout_hash],
            ..Default::default()
        }));
        pipeline
    }

    #[test]
    fn test_benign_page_scans_clean() {
        let pipeline = DetectionPipeline::new();
        let result = pipeline.scan(
            &page("https://example.com", vec![]),
            &PageSnapshot {
                url: "https://example.com".to_string(),
                title: String::new(),
                html: "<html><body><p>hello</p></body></html>".to_string(),
            },
            None,
            &[],
        );
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.confidence, 0);
        assert!(result.contributing_signals.is_empty());
    }

    #[test]
    fn test_cloned_brand_with_keylogger_raises_both_layers() {
        let pipeline = seeded_pipeline();
        let keylogger = r#"
            document.addEventListener('keydown', function(e) {
                log += e.key;
            });
        "#
        .to_string();

        let result = pipeline.scan(
            &page("https://evil.tk/login", vec![keylogger]),
            &snapshot("https://evil.tk/login"),
            None,
            &[],
        );

        assert!(matches!(
            result.risk_level,
            RiskLevel::Medium | RiskLevel::High
        ));
        let sources: Vec<SignalSource> = result
            .contributing_signals
            .iter()
            .map(|r| r.signal.source)
            .collect();
        assert!(sources.contains(&SignalSource::Behavioral));
        assert!(sources.contains(&SignalSource::VisualFingerprint));
        assert_eq!(result.layer_confidences.len(), 2);
        assert!(result.confidence > 0);
    }

    #[test]
    fn test_external_signals_join_the_fusion() {
        let pipeline = seeded_pipeline();
        let reputation =
            DetectionSignal::new(SignalSource::UrlReputation, "blocklisted", 0.95);

        let result = pipeline.scan(
            &page("https://evil.tk/login", vec![]),
            &snapshot("https://evil.tk/login"),
            None,
            &[reputation],
        );

        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(
            result.contributing_signals[0].signal.source,
            SignalSource::UrlReputation
        );
    }

    #[test]
    fn test_quiet_layers_emit_no_signals() {
        let behavior = BehaviorResult::default();
        assert!(behavior.to_signal().is_none());
    }
}
