//! Signal Fusion Types
//!
//! Data structures only. `SignalSource` is deliberately a closed enum: the
//! engine's per-source grouping and weight lookup are exhaustive matches,
//! so adding a fifth layer is a compile-visible change.

use serde::{Deserialize, Serialize};

// ============================================================================
// SIGNAL SOURCES
// ============================================================================

/// The four known producers of detection signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    UrlReputation,
    VisualFingerprint,
    Behavioral,
    MlModel,
}

impl SignalSource {
    /// Enumeration order; also the rank tie-break order
    pub const ALL: [SignalSource; 4] = [
        SignalSource::UrlReputation,
        SignalSource::VisualFingerprint,
        SignalSource::Behavioral,
        SignalSource::MlModel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UrlReputation => "url_reputation",
            Self::VisualFingerprint => "visual_fingerprint",
            Self::Behavioral => "behavioral",
            Self::MlModel => "ml_model",
        }
    }
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SIGNALS
// ============================================================================

/// One piece of evidence from one detection layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSignal {
    pub source: SignalSource,
    pub name: String,
    /// Risk score in [0, 1]
    pub score: f32,
    /// Producer-suggested weight in [0, 1]; fusion itself aggregates with
    /// its own per-source configuration weights
    pub weight: f32,
    /// Confidence in [0, 1]; absent means "use the score as confidence"
    pub confidence: Option<f32>,
    /// Opaque producer payload, passed through for explanations/audit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl DetectionSignal {
    pub fn new(source: SignalSource, name: &str, score: f32) -> Self {
        Self {
            source,
            name: name.to_string(),
            score: score.clamp(0.0, 1.0),
            weight: FusionWeights::default().get(source),
            confidence: None,
            details: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Confidence, defaulting to the score when the producer supplied none
    pub fn effective_confidence(&self) -> f32 {
        self.confidence.unwrap_or(self.score)
    }
}

/// A signal plus its role in the fused verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSignal {
    pub signal: DetectionSignal,
    /// Weighted score this signal contributed to aggregation
    pub contribution: f32,
    /// 1 = largest contribution
    pub rank: usize,
}

// ============================================================================
// VERDICT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence of one layer, reported in source enumeration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfidence {
    pub source: SignalSource,
    pub confidence: f32,
    pub signal_count: usize,
}

/// The fused verdict. Deterministic given identical inputs + configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionResult {
    pub risk_level: RiskLevel,
    /// Integer percentage, 0-100
    pub confidence: u8,
    pub contributing_signals: Vec<RankedSignal>,
    pub raw_score: f32,
    pub layer_confidences: Vec<LayerConfidence>,
    pub explanation: String,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Per-source aggregation weights
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    pub url_reputation: f32,
    pub visual_fingerprint: f32,
    pub behavioral: f32,
    pub ml_model: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            url_reputation: 0.3,
            visual_fingerprint: 0.25,
            behavioral: 0.25,
            ml_model: 0.2,
        }
    }
}

impl FusionWeights {
    pub fn get(&self, source: SignalSource) -> f32 {
        match source {
            SignalSource::UrlReputation => self.url_reputation,
            SignalSource::VisualFingerprint => self.visual_fingerprint,
            SignalSource::Behavioral => self.behavioral,
            SignalSource::MlModel => self.ml_model,
        }
    }

    pub fn sum(&self) -> f32 {
        self.url_reputation + self.visual_fingerprint + self.behavioral + self.ml_model
    }

    /// Clamp every weight into [0, 1] (fail-soft on out-of-range writes)
    pub fn clamped(mut self) -> Self {
        self.url_reputation = self.url_reputation.clamp(0.0, 1.0);
        self.visual_fingerprint = self.visual_fingerprint.clamp(0.0, 1.0);
        self.behavioral = self.behavioral.clamp(0.0, 1.0);
        self.ml_model = self.ml_model.clamp(0.0, 1.0);
        self
    }

    /// Rescale so the four weights sum to 1. An all-zero vector falls back
    /// to the defaults rather than dividing by zero.
    pub fn normalized(self) -> Self {
        let sum = self.sum();
        if sum <= 0.0 {
            return Self::default();
        }
        Self {
            url_reputation: self.url_reputation / sum,
            visual_fingerprint: self.visual_fingerprint / sum,
            behavioral: self.behavioral / sum,
            ml_model: self.ml_model / sum,
        }
    }
}

/// Runtime-adjustable fusion configuration. The confidence factor weights
/// and the layer agreement boost are hand-tuned values kept as defaults
/// pending empirical recalibration against labeled data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    pub weights: FusionWeights,
    /// Renormalize weights to sum to 1 on every update
    pub auto_normalize_weights: bool,
    /// rawScore at or above this is high risk
    pub high_threshold: f32,
    /// rawScore at or above this (below high) is medium risk
    pub medium_threshold: f32,
    /// Signals below this confidence are dropped before aggregation
    pub min_signal_confidence: f32,
    /// Corroborating layers needed for full volume confidence
    pub min_signals_for_high_confidence: usize,
    /// Confidence estimate factor weights (volume / agreement / per-signal)
    pub volume_factor_weight: f32,
    pub agreement_factor_weight: f32,
    pub signal_confidence_factor_weight: f32,
    /// Maximum within-layer agreement boost
    pub layer_agreement_boost_cap: f32,
    /// Boost per corroborating signal beyond the first within one layer
    pub layer_agreement_boost_step: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            auto_normalize_weights: true,
            high_threshold: 0.70,
            medium_threshold: 0.40,
            min_signal_confidence: 0.30,
            min_signals_for_high_confidence: 3,
            volume_factor_weight: 0.3,
            agreement_factor_weight: 0.3,
            signal_confidence_factor_weight: 0.4,
            layer_agreement_boost_cap: 0.2,
            layer_agreement_boost_step: 0.1,
        }
    }
}

impl FusionConfig {
    /// Clamp tunables and repair threshold inversions on write.
    pub fn clamped(mut self) -> Self {
        self.weights = self.weights.clamped();
        if self.auto_normalize_weights {
            self.weights = self.weights.normalized();
        }
        self.high_threshold = self.high_threshold.clamp(0.0, 1.0);
        self.medium_threshold = self.medium_threshold.clamp(0.0, self.high_threshold);
        self.min_signal_confidence = self.min_signal_confidence.clamp(0.0, 1.0);
        self.min_signals_for_high_confidence = self.min_signals_for_high_confidence.max(1);
        self.volume_factor_weight = self.volume_factor_weight.clamp(0.0, 1.0);
        self.agreement_factor_weight = self.agreement_factor_weight.clamp(0.0, 1.0);
        self.signal_confidence_factor_weight =
            self.signal_confidence_factor_weight.clamp(0.0, 1.0);
        self.layer_agreement_boost_cap = self.layer_agreement_boost_cap.clamp(0.0, 1.0);
        self.layer_agreement_boost_step = self.layer_agreement_boost_step.clamp(0.0, 1.0);
        self
    }
}
