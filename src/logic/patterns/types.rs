//! Pattern Library Types
//!
//! Data structures only - no matching logic. Rule tables are serde values so
//! a deployment can ship updated tables without recompilation.

use serde::{Deserialize, Serialize};

// ============================================================================
// RULES
// ============================================================================

/// One detection rule: a regular expression plus identity for evidence text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    /// Stable identifier, e.g. "KEY_EVENT_LISTENER"
    pub id: String,
    /// Human-readable description used in evidence strings
    pub description: String,
    /// Regex source (compiled lazily; invalid patterns are skipped)
    pub pattern: String,
}

impl PatternRule {
    pub fn new(id: &str, description: &str, pattern: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Obfuscation rules additionally carry a hit-count floor so density-based
/// indicators (escape sequences, one-letter identifiers) only fire on
/// genuinely dense scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObfuscationRule {
    pub id: String,
    pub description: String,
    pub pattern: String,
    /// Minimum number of matches in one script before the indicator counts
    #[serde(default = "default_min_hits")]
    pub min_hits: usize,
}

fn default_min_hits() -> usize {
    1
}

impl ObfuscationRule {
    pub fn new(id: &str, description: &str, pattern: &str, min_hits: usize) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            pattern: pattern.to_string(),
            min_hits,
        }
    }
}

// ============================================================================
// LIBRARY
// ============================================================================

/// The full rule table set. Versioned and swappable: load a newer table from
/// JSON, append custom rules, then compile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternLibrary {
    /// Table version, bumped whenever the shipped defaults change
    pub version: u32,

    /// Key-capture rules (event listeners, key-code reads)
    pub keylogger_rules: Vec<PatternRule>,
    /// Clipboard write access (one half of the hijack AND gate)
    pub clipboard_write_rules: Vec<PatternRule>,
    /// Clipboard read access (other half of the hijack AND gate)
    pub clipboard_read_rules: Vec<PatternRule>,
    /// Scareware / tech-support-bait phrasing
    pub fake_alert_rules: Vec<PatternRule>,
    /// Obfuscation indicators (accumulate per script)
    pub obfuscation_rules: Vec<ObfuscationRule>,
    /// Cryptocurrency address literal formats (BTC/ETH/LTC)
    pub crypto_address_rules: Vec<PatternRule>,
    /// String-replace call, checked near address literals for swap detection
    pub replace_call_pattern: String,

    /// Field names that indicate credential / payment collection
    pub sensitive_field_pattern: String,
    /// Autocomplete hints that indicate credential / payment collection
    pub sensitive_autocomplete_hints: Vec<String>,

    /// TLDs disproportionately used by throwaway phishing domains
    pub suspicious_tlds: Vec<String>,
    /// Operator-configured suspicious domain list
    pub suspicious_domains: Vec<String>,

    /// Permission names considered sensitive for the excessive-permission gate
    pub sensitive_permissions: Vec<String>,
}

impl PatternLibrary {
    /// Load a library from a serialized table (e.g. a shipped JSON resource).
    pub fn from_json(json: &str) -> Result<Self, PatternError> {
        serde_json::from_str(json).map_err(|e| PatternError::InvalidTable {
            message: e.to_string(),
        })
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        super::library::builtin_library()
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum PatternError {
    /// The serialized rule table could not be parsed at all
    InvalidTable { message: String },
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternError::InvalidTable { message } => {
                write!(f, "Invalid pattern table: {}", message)
            }
        }
    }
}

impl std::error::Error for PatternError {}
