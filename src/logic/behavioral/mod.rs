//! Behavioral Analyzer Module
//!
//! Pattern-based inspection of a page's scripts, forms, redirect chain and
//! permission requests. Corroboration-gated: single rule matches are
//! evidence, not verdicts.
//!
//! # Components
//! - `scripts.rs`: per-family script detectors (keylogger, clipboard hijack,
//!   fake alert, obfuscation, crypto swap)
//! - `forms.rs`: form-target analysis
//! - `redirects.rs`: pure redirect-chain scoring
//! - `analyzer.rs`: page-level composition + configuration
//! - `rules.rs`: thresholds and tunables
//! - `types.rs`: data structures only

pub mod analyzer;
pub mod forms;
pub mod redirects;
pub mod rules;
pub mod scripts;
pub mod types;

pub use analyzer::BehavioralAnalyzer;
pub use rules::{BehaviorConfig, DetectorTuning};
pub use scripts::analyze_scripts;
pub use types::{
    BehaviorPattern, BehaviorPatternKind, BehaviorResult, FormContext, FormInput, FormTarget,
    ObfuscationIndicator, PageContext, RedirectAnalysis, ScriptAnalysis, Severity,
};
