//! Page Fingerprint Computation
//!
//! Derives three independent digests from a snapshot's markup:
//! - DOM structure: tag names and nesting depth, ignoring all text and
//!   attribute values, so copy-pasted templates with different content
//!   still collide
//! - CSS patterns: the set of style property names used inline and in
//!   `<style>` blocks
//! - Layout: coarse geometry - ordering of structural landmarks and the
//!   form-field type sequence
//!
//! The source URL is carried on the fingerprint but never hashed: identical
//! markup on two domains yields identical digests by construction.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::types::{FormFieldDescriptor, PageFingerprint, PageSnapshot};

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*(/?)([a-zA-Z][a-zA-Z0-9-]*)([^>]*)>").expect("static regex"));
static STYLE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)style\s*=\s*"([^"]*)""#).expect("static regex"));
static STYLE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("static regex"));
static CSS_PROP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z-]+)\s*:").expect("static regex"));
static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[0-9a-fA-F]{3,8}\b|rgba?\([^)]*\)").expect("static regex"));
static FONT_FAMILY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)font-family\s*:\s*([^;}<]+)").expect("static regex"));
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)([a-zA-Z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).expect("static regex")
});

/// Tags that never wrap children
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Landmark tags that define coarse layout geometry
const LANDMARK_TAGS: &[&str] = &[
    "header", "nav", "main", "aside", "section", "article", "footer", "form",
];

/// Compute the structural fingerprint of a snapshot. Pure and deterministic:
/// same HTML always yields the same three hashes regardless of the URL.
/// Unparseable markup degrades to hashes over whatever structure was
/// recovered, never an error.
pub fn compute_fingerprint(snapshot: &PageSnapshot) -> PageFingerprint {
    let scan = scan_tags(&snapshot.html);

    PageFingerprint {
        dom_structure_hash: sha256_hex(&scan.dom_description),
        css_pattern_hash: sha256_hex(&css_signature(&snapshot.html)),
        layout_hash: sha256_hex(&scan.layout_description),
        color_palette: color_palette(&snapshot.html),
        font_families: font_families(&snapshot.html),
        form_fields: scan.form_fields,
        source_url: snapshot.url.clone(),
        computed_at: chrono::Utc::now().timestamp(),
    }
}

struct TagScan {
    dom_description: String,
    layout_description: String,
    form_fields: Vec<FormFieldDescriptor>,
}

/// Single pass over all tags: build the nesting description, the landmark /
/// field-type sequence, and the form-field descriptors.
fn scan_tags(html: &str) -> TagScan {
    let mut dom = String::new();
    let mut layout = String::new();
    let mut form_fields = Vec::new();
    let mut depth: usize = 0;

    for caps in TAG_RE.captures_iter(html) {
        let closing = !caps[1].is_empty();
        let tag = caps[2].to_lowercase();
        let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");

        if closing {
            depth = depth.saturating_sub(1);
            continue;
        }

        dom.push_str(&tag);
        dom.push('@');
        dom.push_str(&depth.to_string());
        dom.push(';');

        if LANDMARK_TAGS.contains(&tag.as_str()) {
            layout.push_str(&tag);
            layout.push(';');
        }

        if tag == "input" || tag == "select" || tag == "textarea" {
            let field_type = if tag == "input" {
                attr_value(attrs, "type").unwrap_or_else(|| "text".to_string())
            } else {
                tag.clone()
            };
            layout.push_str("field:");
            layout.push_str(&field_type.to_lowercase());
            layout.push(';');
            form_fields.push(FormFieldDescriptor {
                field_type: field_type.to_lowercase(),
                required: has_attr(attrs, "required"),
                autocomplete: attr_value(attrs, "autocomplete").unwrap_or_default(),
            });
        }

        let self_closing = attrs.trim_end().ends_with('/');
        if !VOID_TAGS.contains(&tag.as_str()) && !self_closing {
            depth += 1;
        }
    }

    TagScan {
        dom_description: dom,
        layout_description: layout,
        form_fields,
    }
}

/// Sorted, deduplicated set of CSS property names seen anywhere in the page.
fn css_signature(html: &str) -> String {
    let mut props: Vec<String> = Vec::new();
    let mut collect = |css: &str| {
        for caps in CSS_PROP_RE.captures_iter(css) {
            props.push(caps[1].to_lowercase());
        }
    };
    for caps in STYLE_BLOCK_RE.captures_iter(html) {
        collect(&caps[1]);
    }
    for caps in STYLE_ATTR_RE.captures_iter(html) {
        collect(&caps[1]);
    }
    props.sort();
    props.dedup();
    props.join(";")
}

/// Colors referenced by inline styles and style blocks, normalized and
/// sorted. Used for weighting, never hashed.
fn color_palette(html: &str) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for caps in STYLE_BLOCK_RE.captures_iter(html) {
        colors.extend(COLOR_RE.find_iter(&caps[1]).map(|m| m.as_str().to_lowercase()));
    }
    for caps in STYLE_ATTR_RE.captures_iter(html) {
        colors.extend(COLOR_RE.find_iter(&caps[1]).map(|m| m.as_str().to_lowercase()));
    }
    colors.sort();
    colors.dedup();
    colors.truncate(16);
    colors
}

fn font_families(html: &str) -> Vec<String> {
    let mut fonts: Vec<String> = FONT_FAMILY_RE
        .captures_iter(html)
        .filter_map(|caps| {
            caps[1]
                .split(',')
                .next()
                .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase())
        })
        .filter(|f| !f.is_empty())
        .collect();
    fonts.sort();
    fonts.dedup();
    fonts
}

fn attr_value(attrs: &str, name: &str) -> Option<String> {
    for caps in ATTR_RE.captures_iter(attrs) {
        if caps[1].eq_ignore_ascii_case(name) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            return Some(value);
        }
    }
    None
}

fn has_attr(attrs: &str, name: &str) -> bool {
    attrs
        .split_whitespace()
        .any(|token| token.trim_end_matches('/').eq_ignore_ascii_case(name))
        || attr_value(attrs, name).is_some()
}

pub(crate) fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
        <html><head><style>body { color: #102a43; font-family: "Open Sans", sans-serif; }</style></head>
        <body>
          <header><nav></nav></header>
          <main>
            <form action="/login" method="post">
              <input type="email" name="user" required>
              <input type="password" name="pass" autocomplete="current-password">
            </form>
          </main>
          <footer></footer>
        </body></html>
    "#;

    fn snapshot(url: &str, html: &str) -> PageSnapshot {
        PageSnapshot {
            url: url.to_string(),
            title: "Login".to_string(),
            html: html.to_string(),
        }
    }

    #[test]
    fn test_hashes_are_domain_independent() {
        let a = compute_fingerprint(&snapshot("https://real-bank.com/login", LOGIN_PAGE));
        let b = compute_fingerprint(&snapshot("https://evil.tk/fake", LOGIN_PAGE));
        assert_eq!(a.dom_structure_hash, b.dom_structure_hash);
        assert_eq!(a.css_pattern_hash, b.css_pattern_hash);
        assert_eq!(a.layout_hash, b.layout_hash);
        assert_ne!(a.source_url, b.source_url);
    }

    #[test]
    fn test_attribute_values_do_not_change_dom_hash() {
        let renamed = LOGIN_PAGE
            .replace(r#"name="user""#, r#"name="customer_email""#)
            .replace(r#"action="/login""#, r#"action="/take""#);
        let a = compute_fingerprint(&snapshot("https://a.com", LOGIN_PAGE));
        let b = compute_fingerprint(&snapshot("https://a.com", &renamed));
        assert_eq!(a.dom_structure_hash, b.dom_structure_hash);
    }

    #[test]
    fn test_structure_change_changes_dom_hash() {
        let altered = LOGIN_PAGE.replace("<footer></footer>", "");
        let a = compute_fingerprint(&snapshot("https://a.com", LOGIN_PAGE));
        let b = compute_fingerprint(&snapshot("https://a.com", &altered));
        assert_ne!(a.dom_structure_hash, b.dom_structure_hash);
    }

    #[test]
    fn test_form_fields_and_palette_extracted() {
        let fp = compute_fingerprint(&snapshot("https://a.com", LOGIN_PAGE));
        assert_eq!(fp.form_fields.len(), 2);
        assert_eq!(fp.form_fields[0].field_type, "email");
        assert!(fp.form_fields[0].required);
        assert_eq!(fp.form_fields[1].field_type, "password");
        assert_eq!(fp.form_fields[1].autocomplete, "current-password");
        assert!(fp.color_palette.contains(&"#102a43".to_string()));
        assert!(fp.font_families.contains(&"open sans".to_string()));
    }

    #[test]
    fn test_empty_html_degrades_to_empty_structure() {
        let fp = compute_fingerprint(&snapshot("https://a.com", ""));
        assert!(fp.form_fields.is_empty());
        assert!(fp.color_palette.is_empty());
        // Still a well-formed digest of the empty description
        assert_eq!(fp.dom_structure_hash.len(), 64);
    }
}
