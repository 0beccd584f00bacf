//! Visual Fingerprint Types
//!
//! Data structures only - hashing and matching logic live in the sibling
//! modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// INPUTS
// ============================================================================

/// A rendered page as handed over by the (already redacted) capture layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub html: String,
}

/// A caller-supplied grayscale image region (logo candidate). Decoding and
/// redaction happen upstream; this core only consumes luma planes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    /// Row-major luminance bytes, length = width * height
    pub luma: Vec<u8>,
}

impl ImageBuffer {
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.luma.len() == (self.width as usize) * (self.height as usize)
    }
}

// ============================================================================
// FINGERPRINTS
// ============================================================================

/// One form field descriptor, used for match weighting, never for hashing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFieldDescriptor {
    pub field_type: String,
    pub required: bool,
    #[serde(default)]
    pub autocomplete: String,
}

/// Structural identity of a rendered page. The three hashes are pure
/// functions of markup structure - never of the hosting domain - so
/// identical markup on two domains yields identical hashes by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFingerprint {
    pub dom_structure_hash: String,
    pub css_pattern_hash: String,
    pub layout_hash: String,
    pub color_palette: Vec<String>,
    pub font_families: Vec<String>,
    pub form_fields: Vec<FormFieldDescriptor>,
    pub source_url: String,
    pub computed_at: i64,
}

/// A known-legitimate brand's canonical shapes. Each hash list is the set of
/// accepted variants across that brand's real page templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandFingerprint {
    pub brand: String,
    /// At least one; pages hosted here are never reported against this brand
    pub legitimate_domains: Vec<String>,
    #[serde(default)]
    pub dom_hashes: Vec<String>,
    #[serde(default)]
    pub css_hashes: Vec<String>,
    #[serde(default)]
    pub layout_hashes: Vec<String>,
    #[serde(default)]
    pub color_palettes: Vec<Vec<String>>,
    #[serde(default)]
    pub font_families: Vec<Vec<String>>,
    #[serde(default)]
    pub logo_hashes: Vec<String>,
    #[serde(default)]
    pub priority: u32,
}

// ============================================================================
// RESULTS
// ============================================================================

/// Result of comparing one page fingerprint to one brand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub brand: String,
    pub legitimate_domain: String,
    /// Fraction of enabled comparisons that coincide, feature-weighted
    pub similarity: f32,
    pub matched_features: Vec<String>,
    /// True iff similarity cleared the threshold and the page host is foreign
    pub is_potential_phishing: bool,
}

/// Pixel bounds of a logo detection within the supplied image
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A perceptual-hash match against a brand logo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoDetection {
    pub brand: String,
    /// `1 - hamming_distance / hash_bits`
    pub confidence: f32,
    pub bounds: Bounds,
    pub perceptual_hash: String,
}

/// Composed visual verdict for one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualAnalysisResult {
    pub fingerprint: PageFingerprint,
    pub matches: Vec<SimilarityMatch>,
    pub logos: Vec<LogoDetection>,
    pub risk_score: f32,
    pub is_suspicious: bool,
    pub suspicion_reasons: Vec<String>,
}

/// Brand database counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub brand_count: usize,
    pub domain_count: usize,
    pub logo_hash_count: usize,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Per-feature contribution to the similarity score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureWeights {
    pub dom_structure: f32,
    pub css_patterns: f32,
    pub layout: f32,
    pub colors: f32,
    pub fonts: f32,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            dom_structure: 0.4,
            css_patterns: 0.25,
            layout: 0.2,
            colors: 0.1,
            fonts: 0.05,
        }
    }
}

/// Runtime-adjustable visual configuration. Out-of-range writes are clamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualConfig {
    pub similarity_threshold: f32,
    pub max_matches: usize,
    pub logo_detection_enabled: bool,
    pub logo_confidence_threshold: f32,
    pub compare_colors: bool,
    pub compare_fonts: bool,
    pub feature_weights: FeatureWeights,
    /// Composite page risk at or above this is suspicious
    pub suspicion_threshold: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            max_matches: 5,
            logo_detection_enabled: true,
            logo_confidence_threshold: 0.85,
            compare_colors: true,
            compare_fonts: true,
            feature_weights: FeatureWeights::default(),
            suspicion_threshold: 0.5,
        }
    }
}

impl VisualConfig {
    pub fn clamped(mut self) -> Self {
        self.similarity_threshold = self.similarity_threshold.clamp(0.0, 1.0);
        self.logo_confidence_threshold = self.logo_confidence_threshold.clamp(0.0, 1.0);
        self.suspicion_threshold = self.suspicion_threshold.clamp(0.0, 1.0);
        self.max_matches = self.max_matches.max(1);
        let w = &mut self.feature_weights;
        w.dom_structure = w.dom_structure.clamp(0.0, 1.0);
        w.css_patterns = w.css_patterns.clamp(0.0, 1.0);
        w.layout = w.layout.clamp(0.0, 1.0);
        w.colors = w.colors.clamp(0.0, 1.0);
        w.fonts = w.fonts.clamp(0.0, 1.0);
        self
    }
}
