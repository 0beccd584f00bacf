//! Signal Fusion Engine
//!
//! Combines heterogeneous detection signals into a single ranked,
//! explainable verdict.
//!
//! Components:
//! - Confidence-floor filtering of weak signals
//! - Per-source reduction (each layer keeps only its strongest signal)
//! - Weighted aggregation and threshold classification
//! - Three-factor confidence estimate (volume, agreement, signal confidence)
//! - Per-layer confidences and a human-readable explanation

use parking_lot::RwLock;

use super::types::{
    DetectionSignal, FusionConfig, FusionResult, FusionWeights, LayerConfidence, RankedSignal,
    RiskLevel, SignalSource,
};

// ============================================================================
// ENGINE
// ============================================================================

pub struct FusionEngine {
    config: RwLock<FusionConfig>,
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FusionEngine {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(FusionConfig::default()),
        }
    }

    // ========================================================================
    // CORE LOGIC
    // ========================================================================

    /// Fuse the given signals into one verdict.
    ///
    /// Pure in its inputs plus a single configuration snapshot taken at
    /// entry, so a concurrent configuration update cannot tear one fusion.
    pub fn fuse_signals(&self, signals: &[DetectionSignal]) -> FusionResult {
        let config = self.config.read().clone();

        // Drop signals below the confidence floor
        let surviving: Vec<&DetectionSignal> = signals
            .iter()
            .filter(|s| s.effective_confidence() >= config.min_signal_confidence)
            .collect();

        // Per-source reduction: strongest signal per layer, in source
        // enumeration order so the output is stable across runs
        let mut reduced: Vec<DetectionSignal> = Vec::new();
        for source in SignalSource::ALL {
            let best = surviving
                .iter()
                .filter(|s| s.source == source)
                .max_by(|a, b| {
                    a.score
                        .partial_cmp(&b.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            if let Some(signal) = best {
                reduced.push((*signal).clone());
            }
        }

        if reduced.is_empty() {
            log::debug!("Fusion: no signals above confidence floor");
            return FusionResult {
                risk_level: RiskLevel::Low,
                confidence: 0,
                contributing_signals: Vec::new(),
                raw_score: 0.0,
                layer_confidences: Vec::new(),
                explanation: "No detection signals were available for this page".to_string(),
            };
        }

        // Weighted aggregation over the reduced set
        let mut weighted_sum = 0.0f32;
        let mut weight_sum = 0.0f32;
        for signal in &reduced {
            let weight = config.weights.get(signal.source);
            weighted_sum += signal.score * weight;
            weight_sum += weight;
        }
        let raw_score = if weight_sum > 0.0 {
            (weighted_sum / weight_sum).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Threshold classification (boundaries inclusive)
        let risk_level = if raw_score >= config.high_threshold {
            RiskLevel::High
        } else if raw_score >= config.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        // Rank by weighted contribution; the stable sort preserves source
        // enumeration order between equal contributions
        let mut ranked: Vec<RankedSignal> = reduced
            .iter()
            .map(|signal| RankedSignal {
                contribution: signal.score * config.weights.get(signal.source),
                signal: signal.clone(),
                rank: 0,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.contribution
                .partial_cmp(&a.contribution)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (i, entry) in ranked.iter_mut().enumerate() {
            entry.rank = i + 1;
        }

        let confidence = self.estimate_confidence(&config, &reduced);
        let layer_confidences = layer_confidences(&config, &surviving);
        let explanation = build_explanation(risk_level, raw_score, confidence, &ranked);

        log::debug!(
            "Fusion: {} signals -> {} reduced, raw {:.3}, {} at {}%",
            signals.len(),
            reduced.len(),
            raw_score,
            risk_level,
            confidence
        );

        FusionResult {
            risk_level,
            confidence,
            contributing_signals: ranked,
            raw_score,
            layer_confidences,
            explanation,
        }
    }

    /// Three-factor confidence estimate over the reduced signal set:
    /// corroboration volume, inter-layer agreement, and the signals' own
    /// confidence, combined with the configured factor weights.
    fn estimate_confidence(&self, config: &FusionConfig, reduced: &[DetectionSignal]) -> u8 {
        let count = reduced.len() as f32;
        let volume =
            (count / config.min_signals_for_high_confidence.max(1) as f32).min(1.0);

        let mean = reduced.iter().map(|s| s.score).sum::<f32>() / count;
        let variance = reduced
            .iter()
            .map(|s| (s.score - mean) * (s.score - mean))
            .sum::<f32>()
            / count;
        let agreement = 1.0 - (4.0 * variance).min(1.0);

        let avg_confidence =
            reduced.iter().map(|s| s.effective_confidence()).sum::<f32>() / count;

        let combined = config.volume_factor_weight * volume
            + config.agreement_factor_weight * agreement
            + config.signal_confidence_factor_weight * avg_confidence;

        (combined.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    pub fn get_weights(&self) -> FusionWeights {
        self.config.read().weights
    }

    /// Replace the aggregation weights. Out-of-range components are clamped
    /// into [0, 1]; when auto-normalization is enabled the stored weights
    /// always sum to 1.
    pub fn update_weights(&self, weights: FusionWeights) {
        let mut config = self.config.write();
        let mut weights = weights.clamped();
        if config.auto_normalize_weights {
            weights = weights.normalized();
        }
        config.weights = weights;
        log::info!("Fusion weights updated");
    }

    pub fn get_config(&self) -> FusionConfig {
        self.config.read().clone()
    }

    pub fn update_config(&self, config: FusionConfig) {
        *self.config.write() = config.clamped();
        log::info!("Fusion config updated");
    }

    pub fn reset_to_defaults(&self) {
        *self.config.write() = FusionConfig::default();
        log::info!("Fusion config reset to defaults");
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Per-layer confidence over the pre-reduction surviving signals: the mean
/// signal confidence plus an agreement boost when several signals in the
/// same layer corroborate each other. Reported in source enumeration order.
fn layer_confidences(
    config: &FusionConfig,
    surviving: &[&DetectionSignal],
) -> Vec<LayerConfidence> {
    let mut out = Vec::new();
    for source in SignalSource::ALL {
        let layer: Vec<&&DetectionSignal> =
            surviving.iter().filter(|s| s.source == source).collect();
        if layer.is_empty() {
            continue;
        }
        let count = layer.len();
        let avg = layer
            .iter()
            .map(|s| s.effective_confidence())
            .sum::<f32>()
            / count as f32;
        let boost = (config.layer_agreement_boost_step * (count as f32 - 1.0))
            .min(config.layer_agreement_boost_cap);
        out.push(LayerConfidence {
            source,
            confidence: (avg + boost).min(1.0),
            signal_count: count,
        });
    }
    out
}

fn build_explanation(
    risk_level: RiskLevel,
    raw_score: f32,
    confidence: u8,
    ranked: &[RankedSignal],
) -> String {
    let top: Vec<String> = ranked
        .iter()
        .take(3)
        .map(|r| format!("{} ({})", r.signal.name, r.signal.source))
        .collect();
    match risk_level {
        RiskLevel::Low => format!(
            "Low risk (score {:.2}, confidence {}%); analysis based on: {}",
            raw_score,
            confidence,
            top.join(", ")
        ),
        RiskLevel::Medium => format!(
            "Medium risk (score {:.2}, confidence {}%); key factors: {}",
            raw_score,
            confidence,
            top.join(", ")
        ),
        RiskLevel::High => format!(
            "High risk (score {:.2}, confidence {}%); key factors: {}",
            raw_score,
            confidence,
            top.join(", ")
        ),
    }
}

// ============================================================================
// TESTS
// ============================================================================
