//! Signal Fusion Module
//!
//! Combines signals from all detection layers into a single verdict.
//!
//! Components:
//! - `types`: signal, verdict, and configuration structures
//! - `engine`: filtering, reduction, weighted aggregation, and explanation

pub mod engine;
pub mod types;

pub use engine::FusionEngine;
pub use types::{
    DetectionSignal, FusionConfig, FusionResult, FusionWeights, LayerConfidence, RankedSignal,
    RiskLevel, SignalSource,
};
