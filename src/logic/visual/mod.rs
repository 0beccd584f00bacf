//! Visual Fingerprint Analyzer Module
//!
//! Structural hashing of rendered pages, brand-similarity matching against a
//! fingerprint database, and perceptual logo matching.
//!
//! # Components
//! - `fingerprint.rs`: DOM/CSS/layout digests (domain-independent by design)
//! - `brand_db.rs`: indexed brand-fingerprint store
//! - `similarity.rs`: weighted feature matching with legitimate-domain exclusion
//! - `logo.rs`: perceptual hashing strategy + Hamming matching
//! - `analyzer.rs`: composition + configuration + database administration
//! - `types.rs`: data structures only

pub mod analyzer;
pub mod brand_db;
pub mod fingerprint;
pub mod logo;
pub mod similarity;
pub mod types;

pub use analyzer::VisualAnalyzer;
pub use brand_db::BrandDatabase;
pub use fingerprint::compute_fingerprint;
pub use logo::{hamming_distance, AverageHasher, PerceptualHasher};
pub use similarity::find_similar;
pub use types::{
    Bounds, BrandFingerprint, DatabaseStats, FeatureWeights, FormFieldDescriptor, ImageBuffer,
    LogoDetection, PageFingerprint, PageSnapshot, SimilarityMatch, VisualAnalysisResult,
    VisualConfig,
};
