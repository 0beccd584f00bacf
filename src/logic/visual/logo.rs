//! Perceptual Logo Matching
//!
//! "Compute a hash" and "compare hashes" are an injectable strategy so the
//! concrete algorithm can be swapped without touching matching/confidence
//! logic. The default is an average hash: downsample the grayscale buffer to
//! an 8x8 grid, threshold each cell against the mean, emit 64 bits. Coarse
//! and illumination-tolerant, compared via normalized Hamming distance.

use super::brand_db::BrandDatabase;
use super::types::{Bounds, ImageBuffer, LogoDetection, VisualConfig};

/// Strategy seam for perceptual hashing.
pub trait PerceptualHasher: Send + Sync {
    /// Hash an image into a fixed-length binary string ('0'/'1' chars).
    /// Returns `None` for invalid/empty buffers.
    fn hash(&self, image: &ImageBuffer) -> Option<String>;

    /// Bit length of produced hashes.
    fn bits(&self) -> usize;
}

/// Mean-threshold average hash over an NxN downsample.
pub struct AverageHasher {
    grid: usize,
}

impl AverageHasher {
    pub fn new() -> Self {
        Self { grid: 8 }
    }
}

impl Default for AverageHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PerceptualHasher for AverageHasher {
    fn hash(&self, image: &ImageBuffer) -> Option<String> {
        if !image.is_valid() {
            return None;
        }
        let cells = downsample(image, self.grid);
        let mean: f64 = cells.iter().sum::<f64>() / cells.len() as f64;
        Some(
            cells
                .iter()
                .map(|&c| if c > mean { '1' } else { '0' })
                .collect(),
        )
    }

    fn bits(&self) -> usize {
        self.grid * self.grid
    }
}

/// Block-average the luma plane into a grid x grid cell matrix (row-major).
fn downsample(image: &ImageBuffer, grid: usize) -> Vec<f64> {
    let w = image.width as usize;
    let h = image.height as usize;
    let mut cells = Vec::with_capacity(grid * grid);

    for gy in 0..grid {
        for gx in 0..grid {
            let x0 = gx * w / grid;
            let x1 = ((gx + 1) * w / grid).max(x0 + 1).min(w);
            let y0 = gy * h / grid;
            let y1 = ((gy + 1) * h / grid).max(y0 + 1).min(h);

            let mut sum = 0u64;
            let mut count = 0u64;
            for y in y0..y1 {
                for x in x0..x1 {
                    sum += image.luma[y * w + x] as u64;
                    count += 1;
                }
            }
            cells.push(if count == 0 {
                0.0
            } else {
                sum as f64 / count as f64
            });
        }
    }
    cells
}

/// Hamming distance between two equal-length binary strings. `None` when the
/// lengths differ (incomparable hash variants).
pub fn hamming_distance(a: &str, b: &str) -> Option<usize> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    Some(a.bytes().zip(b.bytes()).filter(|(x, y)| x != y).count())
}

/// Match one candidate image against every stored brand logo hash.
/// When logo detection is disabled via configuration this returns an empty
/// list with no hashing performed.
pub fn detect_logos(
    image: &ImageBuffer,
    db: &BrandDatabase,
    cfg: &VisualConfig,
    hasher: &dyn PerceptualHasher,
) -> Vec<LogoDetection> {
    if !cfg.logo_detection_enabled {
        return Vec::new();
    }
    let candidate = match hasher.hash(image) {
        Some(h) => h,
        None => return Vec::new(),
    };

    let bounds = Bounds {
        x: 0,
        y: 0,
        width: image.width,
        height: image.height,
    };

    let mut detections = Vec::new();
    for (name, brand) in db.iter() {
        // Best variant per brand
        let mut best: Option<f32> = None;
        for stored in &brand.logo_hashes {
            if let Some(distance) = hamming_distance(&candidate, stored) {
                let confidence = 1.0 - distance as f32 / candidate.len() as f32;
                best = Some(best.map_or(confidence, |b: f32| b.max(confidence)));
            }
        }
        if let Some(confidence) = best {
            if confidence >= cfg.logo_confidence_threshold {
                detections.push(LogoDetection {
                    brand: name.clone(),
                    confidence,
                    bounds,
                    perceptual_hash: candidate.clone(),
                });
            }
        }
    }

    // Descending confidence; brand-name iteration order already breaks ties
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    detections
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::visual::types::BrandFingerprint;

    /// Left half dark, right half bright
    fn split_image(width: u32, height: u32) -> ImageBuffer {
        let mut luma = Vec::with_capacity((width * height) as usize);
        for _y in 0..height {
            for x in 0..width {
                luma.push(if x < width / 2 { 20 } else { 230 });
            }
        }
        ImageBuffer {
            width,
            height,
            luma,
        }
    }

    fn db_with_logo(name: &str, hash: &str) -> BrandDatabase {
        let mut db = BrandDatabase::new();
        db.add(BrandFingerprint {
            brand: name.to_string(),
            legitimate_domains: vec![format!("{}.com", name.to_lowercase())],
            logo_hashes: vec![hash.to_string()],
            ..Default::default()
        });
        db
    }

    #[test]
    fn test_average_hash_is_scale_tolerant() {
        let hasher = AverageHasher::new();
        let small = hasher.hash(&split_image(32, 32)).unwrap();
        let large = hasher.hash(&split_image(128, 128)).unwrap();
        assert_eq!(small.len(), 64);
        assert_eq!(small, large);
    }

    #[test]
    fn test_hamming_distance_rules() {
        assert_eq!(hamming_distance("0101", "0101"), Some(0));
        assert_eq!(hamming_distance("0101", "0110"), Some(2));
        assert_eq!(hamming_distance("01", "0101"), None);
    }

    #[test]
    fn test_exact_logo_match_has_full_confidence() {
        let hasher = AverageHasher::new();
        let image = split_image(64, 64);
        let stored = hasher.hash(&image).unwrap();
        let db = db_with_logo("PayBuddy", &stored);

        let detections = detect_logos(&image, &db, &VisualConfig::default(), &hasher);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].brand, "PayBuddy");
        assert!((detections[0].confidence - 1.0).abs() < f32::EPSILON);
        assert_eq!(detections[0].bounds.width, 64);
    }

    #[test]
    fn test_dissimilar_logo_is_below_threshold() {
        let hasher = AverageHasher::new();
        let image = split_image(64, 64);
        // Stored hash is the exact inverse of the candidate
        let stored: String = hasher
            .hash(&image)
            .unwrap()
            .chars()
            .map(|c| if c == '1' { '0' } else { '1' })
            .collect();
        let db = db_with_logo("PayBuddy", &stored);
        let detections = detect_logos(&image, &db, &VisualConfig::default(), &hasher);
        assert!(detections.is_empty());
    }

    #[test]
    fn test_disabled_logo_detection_short_circuits() {
        let hasher = AverageHasher::new();
        let image = split_image(64, 64);
        let stored = hasher.hash(&image).unwrap();
        let db = db_with_logo("PayBuddy", &stored);
        let cfg = VisualConfig {
            logo_detection_enabled: false,
            ..Default::default()
        };
        assert!(detect_logos(&image, &db, &cfg, &hasher).is_empty());
    }

    #[test]
    fn test_mismatched_hash_length_is_skipped() {
        let hasher = AverageHasher::new();
        let image = split_image(64, 64);
        let db = db_with_logo("PayBuddy", "0101"); // 4-bit variant, incomparable
        assert!(detect_logos(&image, &db, &VisualConfig::default(), &hasher).is_empty());
    }
}
