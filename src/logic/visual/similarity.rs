//! Brand Similarity Matching
//!
//! Compares a page fingerprint against every candidate brand. The
//! legitimate-domain exclusion runs before any reporting: identical markup
//! on the brand's own domain must never self-flag, so that check is the
//! primary false-positive guard of this layer.

use crate::logic::patterns::urls;

use super::brand_db::BrandDatabase;
use super::types::{BrandFingerprint, PageFingerprint, SimilarityMatch, VisualConfig};

/// Minimum fraction of overlapping entries for a palette / font-set
/// comparison to count as coinciding
const SET_OVERLAP_MIN: f32 = 0.6;

/// Compare `fingerprint` against each stored brand, returning matches at or
/// above the similarity threshold, sorted descending and truncated to
/// `max_matches`.
pub fn find_similar(
    fingerprint: &PageFingerprint,
    db: &BrandDatabase,
    cfg: &VisualConfig,
) -> Vec<SimilarityMatch> {
    let host = urls::extract_host(&fingerprint.source_url);

    let mut matches: Vec<SimilarityMatch> = db
        .iter()
        .filter_map(|(_, brand)| {
            // Exclusion first: never report a brand against its own domains
            if let Some(host) = host.as_deref() {
                if BrandDatabase::is_legitimate_host(brand, host) {
                    return None;
                }
            }
            score_brand(fingerprint, brand, cfg)
        })
        .filter(|m| m.similarity >= cfg.similarity_threshold)
        .collect();

    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.brand.cmp(&b.brand))
    });
    matches.truncate(cfg.max_matches);
    matches
}

fn score_brand(
    fingerprint: &PageFingerprint,
    brand: &BrandFingerprint,
    cfg: &VisualConfig,
) -> Option<SimilarityMatch> {
    let weights = &cfg.feature_weights;
    let mut enabled_weight = 0.0f32;
    let mut matched_weight = 0.0f32;
    let mut matched_features = Vec::new();

    let mut compare = |enabled: bool, weight: f32, coincides: bool, feature: &str| {
        if !enabled || weight <= 0.0 {
            return;
        }
        enabled_weight += weight;
        if coincides {
            matched_weight += weight;
            matched_features.push(feature.to_string());
        }
    };

    compare(
        !brand.dom_hashes.is_empty(),
        weights.dom_structure,
        brand.dom_hashes.contains(&fingerprint.dom_structure_hash),
        "dom_structure",
    );
    compare(
        !brand.css_hashes.is_empty(),
        weights.css_patterns,
        brand.css_hashes.contains(&fingerprint.css_pattern_hash),
        "css_patterns",
    );
    compare(
        !brand.layout_hashes.is_empty(),
        weights.layout,
        brand.layout_hashes.contains(&fingerprint.layout_hash),
        "layout",
    );
    compare(
        cfg.compare_colors && !brand.color_palettes.is_empty() && !fingerprint.color_palette.is_empty(),
        weights.colors,
        brand
            .color_palettes
            .iter()
            .any(|palette| set_overlap(&fingerprint.color_palette, palette) >= SET_OVERLAP_MIN),
        "color_palette",
    );
    compare(
        cfg.compare_fonts && !brand.font_families.is_empty() && !fingerprint.font_families.is_empty(),
        weights.fonts,
        brand
            .font_families
            .iter()
            .any(|fonts| set_overlap(&fingerprint.font_families, fonts) >= SET_OVERLAP_MIN),
        "font_families",
    );

    if enabled_weight <= 0.0 {
        return None;
    }
    let similarity = matched_weight / enabled_weight;

    Some(SimilarityMatch {
        brand: brand.brand.clone(),
        legitimate_domain: brand
            .legitimate_domains
            .first()
            .cloned()
            .unwrap_or_default(),
        similarity,
        matched_features,
        // Exclusion already ran, so a surviving over-threshold match is on a
        // foreign host by construction
        is_potential_phishing: similarity >= cfg.similarity_threshold,
    })
}

/// Fraction of the smaller set found in the larger one.
fn set_overlap(a: &[String], b: &[String]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let hits = small.iter().filter(|item| large.contains(item)).count();
    hits as f32 / small.len() as f32
}

// ============================================================================
// TESTS
// ============================================================================
