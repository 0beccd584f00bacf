//! Form Target Analysis
//!
//! Marks forms that collect sensitive data and flags suspicious submission
//! targets. Cross-domain submission alone is not flagged - only when the
//! form also collects sensitive data (deliberate precision/recall tradeoff).

use crate::logic::patterns::{urls, CompiledLibrary};

use super::types::{FormContext, FormTarget};

/// Analyze every form on the page. Malformed or absent forms degrade to an
/// empty list, never an error.
pub fn analyze_forms(
    page_url: &str,
    forms: &[FormContext],
    lib: &CompiledLibrary,
) -> Vec<FormTarget> {
    let page_host = urls::extract_host(page_url);
    forms
        .iter()
        .map(|form| analyze_form(page_host.as_deref(), form, lib))
        .collect()
}

fn analyze_form(page_host: Option<&str>, form: &FormContext, lib: &CompiledLibrary) -> FormTarget {
    let mut collects_sensitive = false;
    let mut field_names = Vec::with_capacity(form.fields.len());

    for field in &form.fields {
        field_names.push(field.name.clone());
        // Sticky: one sensitive field marks the whole form
        if is_sensitive_field(field, lib) {
            collects_sensitive = true;
        }
    }

    let mut reasons = Vec::new();
    let action = form.action.trim();
    let action_lower = action.to_lowercase();

    if action_lower.starts_with("data:") || action_lower.starts_with("javascript:") {
        reasons.push("Form submits to an opaque data:/javascript: target".to_string());
    }

    if let Some(action_host) = urls::extract_host(action) {
        if urls::is_ip_literal(&action_host) {
            reasons.push(format!("Form action targets IP literal {}", action_host));
        }
        if urls::has_suspicious_tld(&action_host, &lib.suspicious_tlds) {
            reasons.push(format!("Form action targets suspicious TLD host {}", action_host));
        }
        if lib
            .suspicious_domains
            .iter()
            .any(|d| urls::is_same_or_subdomain(&action_host, d))
        {
            reasons.push(format!("Form action targets listed domain {}", action_host));
        }
        if let Some(page_host) = page_host {
            if action_host != page_host && collects_sensitive {
                reasons.push(format!(
                    "Sensitive fields submitted cross-domain to {}",
                    action_host
                ));
            }
        }
    }

    let is_suspicious = !reasons.is_empty();
    FormTarget {
        action: form.action.clone(),
        method: form.method.clone(),
        fields: field_names,
        collects_sensitive_data: collects_sensitive,
        is_suspicious,
        reason: if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        },
    }
}

fn is_sensitive_field(field: &super::types::FormInput, lib: &CompiledLibrary) -> bool {
    if field.field_type.eq_ignore_ascii_case("password") {
        return true;
    }
    let autocomplete = field.autocomplete.to_lowercase();
    if !autocomplete.is_empty()
        && lib
            .sensitive_autocomplete_hints
            .iter()
            .any(|hint| autocomplete.contains(hint))
    {
        return true;
    }
    match &lib.sensitive_field {
        Some(re) => re.is_match(&field.name),
        None => false,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::behavioral::types::FormInput;

    fn lib() -> CompiledLibrary {
        CompiledLibrary::default()
    }

    fn password_form(action: &str) -> FormContext {
        FormContext {
            action: action.to_string(),
            method: "POST".to_string(),
            fields: vec![
                FormInput {
                    name: "user".to_string(),
                    field_type: "text".to_string(),
                    autocomplete: String::new(),
                },
                FormInput {
                    name: "pw".to_string(),
                    field_type: "password".to_string(),
                    autocomplete: String::new(),
                },
            ],
        }
    }

    #[test]
    fn test_cross_domain_sensitive_form_is_flagged_with_both_reasons() {
        let forms = vec![password_form("https://evil.tk/collect")];
        let targets = analyze_forms("https://mybank.com", &forms, &lib());
        assert_eq!(targets.len(), 1);
        let t = &targets[0];
        assert!(t.collects_sensitive_data);
        assert!(t.is_suspicious);
        let reason = t.reason.as_deref().unwrap();
        assert!(reason.contains("suspicious TLD"));
        assert!(reason.contains("cross-domain"));
    }

    #[test]
    fn test_cross_domain_without_sensitive_fields_is_not_flagged() {
        let form = FormContext {
            action: "https://search-partner.com/q".to_string(),
            method: "GET".to_string(),
            fields: vec![FormInput {
                name: "q".to_string(),
                field_type: "text".to_string(),
                autocomplete: String::new(),
            }],
        };
        let targets = analyze_forms("https://example.com", &[form], &lib());
        assert!(!targets[0].is_suspicious);
        assert!(!targets[0].collects_sensitive_data);
    }

    #[test]
    fn test_same_domain_password_form_is_fine() {
        let forms = vec![password_form("https://mybank.com/login")];
        let targets = analyze_forms("https://mybank.com", &forms, &lib());
        assert!(targets[0].collects_sensitive_data);
        assert!(!targets[0].is_suspicious);
    }

    #[test]
    fn test_autocomplete_hint_marks_sensitive() {
        let form = FormContext {
            action: "/pay".to_string(),
            method: "POST".to_string(),
            fields: vec![FormInput {
                name: "field_1".to_string(),
                field_type: "text".to_string(),
                autocomplete: "cc-number".to_string(),
            }],
        };
        let targets = analyze_forms("https://shop.example.com", &[form], &lib());
        assert!(targets[0].collects_sensitive_data);
    }

    #[test]
    fn test_javascript_action_is_flagged() {
        let form = FormContext {
            action: "javascript:void(0)".to_string(),
            method: "POST".to_string(),
            fields: Vec::new(),
        };
        let targets = analyze_forms("https://example.com", &[form], &lib());
        assert!(targets[0].is_suspicious);
    }

    #[test]
    fn test_ip_literal_action_is_flagged() {
        let form = password_form("http://203.0.113.9/login");
        let targets = analyze_forms("https://example.com", &[form], &lib());
        let reason = targets[0].reason.as_deref().unwrap();
        assert!(reason.contains("IP literal"));
    }

    #[test]
    fn test_no_forms_is_empty_not_error() {
        let targets = analyze_forms("https://example.com", &[], &lib());
        assert!(targets.is_empty());
    }
}
