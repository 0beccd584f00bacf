//! Behavioral Analyzer Types
//!
//! Data structures only - no detection logic.

use serde::{Deserialize, Serialize};

// ============================================================================
// SEVERITY
// ============================================================================

/// Severity levels for detected behavior patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Contribution weight of one pattern of this severity to the page score
    pub fn weight(&self) -> f32 {
        match self {
            Severity::Low => 0.05,
            Severity::Medium => 0.15,
            Severity::High => 0.25,
            Severity::Critical => 0.4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PATTERNS
// ============================================================================

/// The closed set of suspicious behaviors the analyzer can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorPatternKind {
    Keylogger,
    ClipboardHijack,
    CryptoSwap,
    FakeAlert,
    ObfuscatedJs,
    SuspiciousRedirect,
    ExcessivePermissions,
}

impl BehaviorPatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keylogger => "keylogger",
            Self::ClipboardHijack => "clipboard_hijack",
            Self::CryptoSwap => "crypto_swap",
            Self::FakeAlert => "fake_alert",
            Self::ObfuscatedJs => "obfuscated_js",
            Self::SuspiciousRedirect => "suspicious_redirect",
            Self::ExcessivePermissions => "excessive_permissions",
        }
    }

    /// Default severity assigned to patterns of this kind
    pub fn severity(&self) -> Severity {
        match self {
            Self::Keylogger => Severity::Critical,
            Self::ClipboardHijack => Severity::High,
            Self::CryptoSwap => Severity::Critical,
            Self::FakeAlert => Severity::High,
            Self::ObfuscatedJs => Severity::Medium,
            Self::SuspiciousRedirect => Severity::Medium,
            Self::ExcessivePermissions => Severity::Low,
        }
    }
}

impl std::fmt::Display for BehaviorPatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected suspicious behavior. Never created below the configured
/// confidence floor of its detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorPattern {
    pub kind: BehaviorPatternKind,
    /// Confidence in [0, 1]
    pub confidence: f32,
    pub severity: Severity,
    /// Free-text evidence (matched rule descriptions)
    pub evidence: String,
}

/// One obfuscation technique observed in a script. Two or more on the same
/// script promote to a single `ObfuscatedJs` pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObfuscationIndicator {
    pub id: String,
    pub confidence: f32,
    pub evidence: String,
}

// ============================================================================
// INPUTS
// ============================================================================

/// One form field as observed in the (already redacted) DOM
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormInput {
    pub name: String,
    pub field_type: String,
    #[serde(default)]
    pub autocomplete: String,
}

/// A form-like submission target as observed in the page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormContext {
    pub action: String,
    pub method: String,
    pub fields: Vec<FormInput>,
}

/// Everything the behavioral layer sees about one page event. Supplied by
/// the capture layer; absence of any part is a valid zero-evidence input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageContext {
    pub url: String,
    #[serde(default)]
    pub scripts: Vec<String>,
    #[serde(default)]
    pub forms: Vec<FormContext>,
    #[serde(default)]
    pub redirect_chain: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

// ============================================================================
// RESULTS
// ============================================================================

/// Verdict on one form. Sensitivity is sticky: once any field matches a
/// sensitive pattern the form stays `collects_sensitive_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTarget {
    pub action: String,
    pub method: String,
    pub fields: Vec<String>,
    pub collects_sensitive_data: bool,
    pub is_suspicious: bool,
    pub reason: Option<String>,
}

/// Patterns found across all scripts plus a script-layer risk score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptAnalysis {
    pub patterns: Vec<BehaviorPattern>,
    /// Capped sum of severity-weighted pattern confidences, in [0, 1]
    pub risk_score: f32,
}

/// Pure result of redirect-chain inspection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedirectAnalysis {
    pub is_suspicious: bool,
    pub risk_score: f32,
    pub reasons: Vec<String>,
}

/// Full behavioral verdict for one page event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorResult {
    pub patterns: Vec<BehaviorPattern>,
    pub forms: Vec<FormTarget>,
    pub redirect: RedirectAnalysis,
    /// Overall page risk in [0, 1]
    pub risk_score: f32,
}
