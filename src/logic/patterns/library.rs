//! Built-in Rule Tables + Compilation
//!
//! The shipped defaults for every detector family, and the compile step that
//! turns a (possibly customized) `PatternLibrary` into ready-to-run regex
//! sets. Compilation is fail-soft: a corrupt rule is skipped with a warning
//! so one bad custom pattern never blinds a whole detector.

use regex::Regex;

use super::types::{ObfuscationRule, PatternLibrary, PatternRule};

// ============================================================================
// BUILT-IN TABLES
// ============================================================================

pub const BUILTIN_VERSION: u32 = 3;

/// TLDs disproportionately used by throwaway phishing domains
const SUSPICIOUS_TLDS: &[&str] = &[
    "tk", "ml", "ga", "cf", "gq", "xyz", "top", "work", "click", "loan",
    "date", "racing", "win", "review", "stream", "download", "bid", "trade",
    "icu", "buzz", "monster", "zip", "mov",
];

const SENSITIVE_AUTOCOMPLETE_HINTS: &[&str] =
    &["password", "cc-", "credit-card", "one-time-code"];

const SENSITIVE_PERMISSIONS: &[&str] = &[
    "geolocation",
    "camera",
    "microphone",
    "notifications",
    "clipboard-read",
    "background-sync",
    "persistent-storage",
];

fn keylogger_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new(
            "KEY_EVENT_LISTENER",
            "Keyboard event listener registered",
            r#"addEventListener\s*\(\s*['"](?:keydown|keyup|keypress)['"]"#,
        ),
        PatternRule::new(
            "KEY_HANDLER_ASSIGN",
            "Keyboard handler property assigned",
            r"\.onkey(?:down|up|press)\s*=",
        ),
        PatternRule::new(
            "KEY_CODE_READ",
            "Key code read from event object",
            r"\b(?:event|e|evt)\.(?:keyCode|charCode|key|which)\b",
        ),
        PatternRule::new(
            "KEY_BUFFER_APPEND",
            "Keystroke appended to accumulator",
            r"\b(?:keys?|buf(?:fer)?|log)\w*\s*\+=\s*(?:event|e|evt)\.key\b",
        ),
    ]
}

fn clipboard_write_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new(
            "CLIPBOARD_WRITE_TEXT",
            "Clipboard writeText call",
            r"clipboard\.writeText\s*\(",
        ),
        PatternRule::new(
            "EXEC_COMMAND_COPY",
            "execCommand copy call",
            r#"execCommand\s*\(\s*['"]copy['"]"#,
        ),
        PatternRule::new(
            "CLIPBOARD_SET_DATA",
            "clipboardData.setData call",
            r"clipboardData\.setData\s*\(",
        ),
    ]
}

fn clipboard_read_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new(
            "CLIPBOARD_READ_TEXT",
            "Clipboard readText call",
            r"clipboard\.readText\s*\(",
        ),
        PatternRule::new(
            "PASTE_LISTENER",
            "Paste event listener registered",
            r#"addEventListener\s*\(\s*['"]paste['"]"#,
        ),
        PatternRule::new(
            "CLIPBOARD_GET_DATA",
            "clipboardData.getData call",
            r"clipboardData\.getData\s*\(",
        ),
    ]
}

fn fake_alert_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new(
            "INFECTED_CLAIM",
            "Claim that the device is infected",
            r"(?i)your (?:computer|device|system|pc) (?:is|has been|was) (?:infected|compromised|hacked|locked)",
        ),
        PatternRule::new(
            "VIRUS_FOUND",
            "Virus detected claim",
            r"(?i)(?:virus|trojan|malware|spyware)e?s? (?:detected|found|alert)",
        ),
        PatternRule::new(
            "CALL_SUPPORT",
            "Tech-support call bait",
            r"(?i)call (?:microsoft|apple|windows|google|amazon|tech(?:nical)?) (?:support|helpline|now)",
        ),
        PatternRule::new(
            "TOLL_FREE_BAIT",
            "Toll-free number next to an urgency prompt",
            r"(?i)(?:call|dial)[^\n]{0,40}\+?1[\s.-]?8(?:00|33|44|55|66|77|88)[\s.-]?\d{3}[\s.-]?\d{4}",
        ),
        PatternRule::new(
            "DO_NOT_CLOSE",
            "Instruction not to close or restart",
            r"(?i)do not (?:close|restart|shut ?down|turn off) (?:this|your)",
        ),
        PatternRule::new(
            "ACCOUNT_SUSPENDED",
            "Account suspension urgency claim",
            r"(?i)your account (?:will be|has been|is) (?:suspended|terminated|locked|disabled)",
        ),
    ]
}

fn obfuscation_rules() -> Vec<ObfuscationRule> {
    vec![
        ObfuscationRule::new("EVAL_CALL", "eval() usage", r"\beval\s*\(", 1),
        ObfuscationRule::new(
            "FUNCTION_CONSTRUCTOR",
            "Function constructor from string",
            r#"\bnew\s+Function\s*\(|\bFunction\s*\(\s*['"]"#,
            1,
        ),
        ObfuscationRule::new("BASE64_DECODE", "Base64 decode (atob)", r"\batob\s*\(", 1),
        ObfuscationRule::new(
            "CHAR_CODE_ASSEMBLY",
            "String assembled from char codes",
            r"String\.fromCharCode",
            3,
        ),
        ObfuscationRule::new(
            "HEX_ESCAPE_DENSITY",
            "Dense hex escape sequences",
            r"\\x[0-9a-fA-F]{2}",
            20,
        ),
        ObfuscationRule::new(
            "UNICODE_ESCAPE_DENSITY",
            "Dense unicode escape sequences",
            r"\\u[0-9a-fA-F]{4}",
            20,
        ),
        ObfuscationRule::new(
            "SHORT_NAME_DENSITY",
            "Dense single-letter identifiers",
            r"\b(?:var|let|const)\s+[a-zA-Z_$]\s*[=;,]",
            15,
        ),
        ObfuscationRule::new(
            "SWITCH_FLATTENING",
            "Switch-based control-flow flattening",
            r"while\s*\(\s*(?:true|1|!!\[\])\s*\)\s*\{\s*switch\s*\(",
            1,
        ),
    ]
}

fn crypto_address_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new(
            "BTC_P2PKH",
            "Bitcoin legacy address literal",
            r"\b[13][a-km-zA-HJ-NP-Z1-9]{25,34}\b",
        ),
        PatternRule::new(
            "BTC_BECH32",
            "Bitcoin bech32 address literal",
            r"\bbc1[ac-hj-np-z02-9]{8,87}\b",
        ),
        PatternRule::new(
            "ETH_ADDRESS",
            "Ethereum address literal",
            r"\b0x[a-fA-F0-9]{40}\b",
        ),
        PatternRule::new(
            "LTC_ADDRESS",
            "Litecoin address literal",
            r"\b[LM][a-km-zA-HJ-NP-Z1-9]{26,33}\b",
        ),
    ]
}

/// The shipped default library.
pub fn builtin_library() -> PatternLibrary {
    PatternLibrary {
        version: BUILTIN_VERSION,
        keylogger_rules: keylogger_rules(),
        clipboard_write_rules: clipboard_write_rules(),
        clipboard_read_rules: clipboard_read_rules(),
        fake_alert_rules: fake_alert_rules(),
        obfuscation_rules: obfuscation_rules(),
        crypto_address_rules: crypto_address_rules(),
        replace_call_pattern: r"\.replace\s*\(".to_string(),
        sensitive_field_pattern: concat!(
            r"(?i)pass(?:word)?|passwd|pwd|cvv|cvc|cvn|card[-_ ]?(?:number|num)|ccnum",
            r"|credit|ssn|social[-_ ]?security|secret|otp|one[-_ ]?time|2fa|mfa",
            r"|routing|iban|swift|account[-_ ]?(?:no|num)|\bpin\b"
        )
        .to_string(),
        sensitive_autocomplete_hints: SENSITIVE_AUTOCOMPLETE_HINTS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        suspicious_tlds: SUSPICIOUS_TLDS.iter().map(|s| s.to_string()).collect(),
        suspicious_domains: Vec::new(),
        sensitive_permissions: SENSITIVE_PERMISSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

// ============================================================================
// COMPILED FORM
// ============================================================================

/// A rule whose regex compiled successfully.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub id: String,
    pub description: String,
    pub regex: Regex,
}

#[derive(Debug, Clone)]
pub struct CompiledObfuscationRule {
    pub id: String,
    pub description: String,
    pub regex: Regex,
    pub min_hits: usize,
}

/// A `PatternLibrary` with every valid regex compiled once, ready for the
/// analyzers. Invalid rules are dropped here, never at scan time.
#[derive(Debug, Clone)]
pub struct CompiledLibrary {
    pub version: u32,
    pub keylogger: Vec<CompiledRule>,
    pub clipboard_write: Vec<CompiledRule>,
    pub clipboard_read: Vec<CompiledRule>,
    pub fake_alert: Vec<CompiledRule>,
    pub obfuscation: Vec<CompiledObfuscationRule>,
    pub crypto_address: Vec<CompiledRule>,
    pub replace_call: Option<Regex>,
    pub sensitive_field: Option<Regex>,
    pub sensitive_autocomplete_hints: Vec<String>,
    pub suspicious_tlds: Vec<String>,
    pub suspicious_domains: Vec<String>,
    pub sensitive_permissions: Vec<String>,
}

impl CompiledLibrary {
    pub fn compile(lib: &PatternLibrary) -> Self {
        Self {
            version: lib.version,
            keylogger: compile_rules(&lib.keylogger_rules, "keylogger"),
            clipboard_write: compile_rules(&lib.clipboard_write_rules, "clipboard_write"),
            clipboard_read: compile_rules(&lib.clipboard_read_rules, "clipboard_read"),
            fake_alert: compile_rules(&lib.fake_alert_rules, "fake_alert"),
            obfuscation: compile_obfuscation_rules(&lib.obfuscation_rules),
            crypto_address: compile_rules(&lib.crypto_address_rules, "crypto_address"),
            replace_call: compile_single(&lib.replace_call_pattern, "replace_call"),
            sensitive_field: compile_single(&lib.sensitive_field_pattern, "sensitive_field"),
            sensitive_autocomplete_hints: lib.sensitive_autocomplete_hints.clone(),
            suspicious_tlds: lib
                .suspicious_tlds
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            suspicious_domains: lib
                .suspicious_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            sensitive_permissions: lib
                .sensitive_permissions
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }
}

impl Default for CompiledLibrary {
    fn default() -> Self {
        Self::compile(&PatternLibrary::default())
    }
}

fn compile_rules(rules: &[PatternRule], family: &str) -> Vec<CompiledRule> {
    let mut compiled = Vec::with_capacity(rules.len());
    for rule in rules {
        match Regex::new(&rule.pattern) {
            Ok(regex) => compiled.push(CompiledRule {
                id: rule.id.clone(),
                description: rule.description.clone(),
                regex,
            }),
            Err(e) => {
                log::warn!(
                    "Skipping invalid {} rule '{}': {}",
                    family,
                    rule.id,
                    e
                );
            }
        }
    }
    compiled
}

fn compile_obfuscation_rules(rules: &[ObfuscationRule]) -> Vec<CompiledObfuscationRule> {
    let mut compiled = Vec::with_capacity(rules.len());
    for rule in rules {
        match Regex::new(&rule.pattern) {
            Ok(regex) => compiled.push(CompiledObfuscationRule {
                id: rule.id.clone(),
                description: rule.description.clone(),
                regex,
                min_hits: rule.min_hits.max(1),
            }),
            Err(e) => {
                log::warn!("Skipping invalid obfuscation rule '{}': {}", rule.id, e);
            }
        }
    }
    compiled
}

fn compile_single(pattern: &str, name: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Skipping invalid {} pattern: {}", name, e);
            None
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_library_compiles_fully() {
        let lib = builtin_library();
        let compiled = CompiledLibrary::compile(&lib);
        assert_eq!(compiled.keylogger.len(), lib.keylogger_rules.len());
        assert_eq!(compiled.obfuscation.len(), lib.obfuscation_rules.len());
        assert!(compiled.sensitive_field.is_some());
        assert!(compiled.replace_call.is_some());
    }

    #[test]
    fn test_invalid_rule_is_skipped_not_fatal() {
        let mut lib = builtin_library();
        lib.keylogger_rules
            .push(PatternRule::new("BROKEN", "unbalanced paren", r"(unclosed"));
        let compiled = CompiledLibrary::compile(&lib);
        // One rule dropped, siblings survive
        assert_eq!(compiled.keylogger.len(), lib.keylogger_rules.len() - 1);
    }

    #[test]
    fn test_library_roundtrips_through_json() {
        let lib = builtin_library();
        let json = serde_json::to_string(&lib).unwrap();
        let reloaded = PatternLibrary::from_json(&json).unwrap();
        assert_eq!(reloaded.version, lib.version);
        assert_eq!(reloaded.keylogger_rules.len(), lib.keylogger_rules.len());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(PatternLibrary::from_json("not json").is_err());
    }

    #[test]
    fn test_crypto_address_rules_match_known_formats() {
        let compiled = CompiledLibrary::default();
        let btc = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
        let eth = "0x52908400098527886E0F7030069857D2E4169EE7";
        assert!(compiled.crypto_address.iter().any(|r| r.regex.is_match(btc)));
        assert!(compiled.crypto_address.iter().any(|r| r.regex.is_match(eth)));
    }
}
