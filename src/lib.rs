//! Scam Shield Core - Detection & Fusion Pipeline
//!
//! Client-side threat scoring for phishing/scam detection. Three engines:
//! - `logic::behavioral` - pattern-based script/form/redirect inspection
//! - `logic::visual` - structural hashing, brand similarity, logo matching
//! - `logic::fusion` - weighted signal aggregation into one verdict
//!
//! All engines are synchronous and pure with respect to their inputs; the
//! only mutable state is engine configuration and the brand-fingerprint
//! database, both behind reader-writer locks. Upstream collaborators
//! (redaction, URL reputation, ML pipeline) and downstream ones (alerting,
//! storage) live outside this crate.

pub mod logic;

pub use logic::behavioral::{BehaviorPattern, BehaviorResult, BehavioralAnalyzer, PageContext};
pub use logic::patterns::{PatternError, PatternLibrary};
pub use logic::fusion::{DetectionSignal, FusionEngine, FusionResult, RiskLevel, SignalSource};
pub use logic::pipeline::DetectionPipeline;
pub use logic::visual::{PageSnapshot, VisualAnalysisResult, VisualAnalyzer};
