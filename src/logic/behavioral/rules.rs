//! Behavioral Thresholds & Tunables
//!
//! Constants and the configurable `BehaviorConfig`. No detection logic here.
//! The corroboration minimums are the primary false-positive control: single
//! rule matches are evidence, not verdicts.

use serde::{Deserialize, Serialize};

// ============================================================================
// CORROBORATION MINIMUMS
// ============================================================================

/// Independent keylogger rules required before a pattern is emitted
pub const KEYLOGGER_MIN_MATCHES: usize = 2;

/// Fake-alert rules required before a pattern is emitted
pub const FAKE_ALERT_MIN_MATCHES: usize = 2;

/// Obfuscation indicators on one script required for promotion
pub const OBFUSCATION_MIN_INDICATORS: usize = 2;

/// Sensitive permission requests required for an excessive-permissions pattern
pub const EXCESSIVE_PERMISSIONS_MIN: usize = 3;

// ============================================================================
// REDIRECT CHAIN
// ============================================================================

/// Hops beyond this add chain-length risk
pub const REDIRECT_CHAIN_CAP: usize = 5;

/// Distinct hosts beyond this add host-churn risk
pub const REDIRECT_MAX_HOSTS: usize = 3;

pub const REDIRECT_LONG_CHAIN_RISK: f32 = 0.3;
pub const REDIRECT_MANY_HOSTS_RISK: f32 = 0.2;
pub const REDIRECT_DOWNGRADE_RISK: f32 = 0.4;
pub const REDIRECT_IP_HOP_RISK: f32 = 0.2;
pub const REDIRECT_BAD_TLD_RISK: f32 = 0.2;

/// At or above this chain risk the chain is flagged suspicious
pub const REDIRECT_SUSPICIOUS_THRESHOLD: f32 = 0.3;

// ============================================================================
// PAGE SCORE WEIGHTS
// ============================================================================

/// Contribution per suspicious form to the page score
pub const SUSPICIOUS_FORM_WEIGHT: f32 = 0.2;

/// Contribution of the script-layer risk score to the page score
pub const SCRIPT_LAYER_WEIGHT: f32 = 0.3;

// ============================================================================
// DETECTOR TUNING
// ============================================================================

/// Per-detector confidence curve: `min(base + count * increment, cap)`.
/// More corroborating matches raise confidence monotonically, but text
/// matching alone never reaches certainty (cap < 1).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectorTuning {
    pub base: f32,
    pub increment: f32,
    pub cap: f32,
}

impl DetectorTuning {
    pub const fn new(base: f32, increment: f32, cap: f32) -> Self {
        Self {
            base,
            increment,
            cap,
        }
    }

    /// Confidence for `count` corroborating matches
    pub fn confidence(&self, count: usize) -> f32 {
        (self.base + count as f32 * self.increment).min(self.cap)
    }
}

/// Runtime-adjustable behavioral configuration. Out-of-range writes are
/// clamped, never rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    pub keylogger: DetectorTuning,
    pub clipboard_hijack: DetectorTuning,
    pub fake_alert: DetectorTuning,
    pub obfuscation: DetectorTuning,
    pub excessive_permissions: DetectorTuning,
    /// Crypto-swap requires three simultaneous conditions, so its confidence
    /// is a single calibrated value rather than a match-count curve
    pub crypto_swap_confidence: f32,
    /// Hops beyond this add chain-length risk
    pub redirect_chain_cap: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            keylogger: DetectorTuning::new(0.35, 0.15, 0.9),
            clipboard_hijack: DetectorTuning::new(0.5, 0.15, 0.9),
            fake_alert: DetectorTuning::new(0.4, 0.15, 0.85),
            obfuscation: DetectorTuning::new(0.3, 0.2, 0.9),
            excessive_permissions: DetectorTuning::new(0.3, 0.1, 0.7),
            crypto_swap_confidence: 0.85,
            redirect_chain_cap: REDIRECT_CHAIN_CAP,
        }
    }
}

impl BehaviorConfig {
    /// Clamp every tunable into valid range. Applied on write (fail-soft).
    pub fn clamped(mut self) -> Self {
        for tuning in [
            &mut self.keylogger,
            &mut self.clipboard_hijack,
            &mut self.fake_alert,
            &mut self.obfuscation,
            &mut self.excessive_permissions,
        ] {
            tuning.base = tuning.base.clamp(0.0, 1.0);
            tuning.increment = tuning.increment.clamp(0.0, 1.0);
            tuning.cap = tuning.cap.clamp(tuning.base, 1.0);
        }
        self.crypto_swap_confidence = self.crypto_swap_confidence.clamp(0.0, 1.0);
        self.redirect_chain_cap = self.redirect_chain_cap.max(1);
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_curve_monotonic_and_capped() {
        let t = DetectorTuning::new(0.35, 0.15, 0.9);
        assert!(t.confidence(2) < t.confidence(3));
        assert_eq!(t.confidence(10), 0.9);
    }

    #[test]
    fn test_clamp_fixes_inverted_cap() {
        let mut cfg = BehaviorConfig::default();
        cfg.keylogger = DetectorTuning::new(0.8, 0.1, 0.2); // cap below base
        let cfg = cfg.clamped();
        assert!(cfg.keylogger.cap >= cfg.keylogger.base);
    }
}
