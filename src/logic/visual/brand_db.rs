//! Brand Fingerprint Database
//!
//! Indexed store keyed by brand name with a secondary index over legitimate
//! domains, so exclusion checks stay cheap as the database grows toward
//! thousands of brands. Iteration order is by brand name (BTreeMap), which
//! keeps match output deterministic.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::logic::patterns::urls;

use super::types::{BrandFingerprint, DatabaseStats};

#[derive(Debug, Default)]
pub struct BrandDatabase {
    brands: BTreeMap<String, BrandFingerprint>,
    /// exact legitimate domain -> brand names registered under it
    domain_index: HashMap<String, HashSet<String>>,
}

impl BrandDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a brand record. Domains are normalized to lowercase.
    /// A record without legitimate domains is rejected (the non-flagging
    /// guarantee would be meaningless without one).
    pub fn add(&mut self, mut brand: BrandFingerprint) -> bool {
        if brand.brand.is_empty() || brand.legitimate_domains.is_empty() {
            log::warn!("Rejecting brand record without name or legitimate domains");
            return false;
        }
        brand.legitimate_domains = brand
            .legitimate_domains
            .iter()
            .map(|d| d.to_lowercase())
            .collect();

        if let Some(old) = self.brands.remove(&brand.brand) {
            self.unindex(&old);
        }
        for domain in &brand.legitimate_domains {
            self.domain_index
                .entry(domain.clone())
                .or_default()
                .insert(brand.brand.clone());
        }
        log::info!("Brand '{}' added to fingerprint database", brand.brand);
        self.brands.insert(brand.brand.clone(), brand);
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<BrandFingerprint> {
        let removed = self.brands.remove(name)?;
        self.unindex(&removed);
        log::info!("Brand '{}' removed from fingerprint database", name);
        Some(removed)
    }

    /// "Not found" is a value, never an error.
    pub fn get(&self, name: &str) -> Option<&BrandFingerprint> {
        self.brands.get(name)
    }

    /// Brands for which `host` is a legitimate domain (or subdomain of one).
    /// Walks the host's domain suffixes against the index instead of
    /// scanning every brand.
    pub fn brands_for_host(&self, host: &str) -> HashSet<&str> {
        let mut out = HashSet::new();
        let host = host.to_lowercase();
        let labels: Vec<&str> = host.split('.').collect();
        for start in 0..labels.len() {
            let suffix = labels[start..].join(".");
            if let Some(brands) = self.domain_index.get(&suffix) {
                out.extend(brands.iter().map(|b| b.as_str()));
            }
        }
        out
    }

    /// Whether `host` is legitimate for the given brand record.
    pub fn is_legitimate_host(brand: &BrandFingerprint, host: &str) -> bool {
        brand
            .legitimate_domains
            .iter()
            .any(|d| urls::is_same_or_subdomain(host, d))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BrandFingerprint)> {
        self.brands.iter()
    }

    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            brand_count: self.brands.len(),
            domain_count: self.domain_index.len(),
            logo_hash_count: self.brands.values().map(|b| b.logo_hashes.len()).sum(),
        }
    }

    fn unindex(&mut self, brand: &BrandFingerprint) {
        for domain in &brand.legitimate_domains {
            if let Some(set) = self.domain_index.get_mut(domain) {
                set.remove(&brand.brand);
                if set.is_empty() {
                    self.domain_index.remove(domain);
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(name: &str, domains: &[&str]) -> BrandFingerprint {
        BrandFingerprint {
            brand: name.to_string(),
            legitimate_domains: domains.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_get_remove_roundtrip() {
        let mut db = BrandDatabase::new();
        assert!(db.add(brand("PayBuddy", &["paybuddy.com"])));
        assert!(db.get("PayBuddy").is_some());
        assert!(db.get("Unknown").is_none());
        assert!(db.remove("PayBuddy").is_some());
        assert!(db.get("PayBuddy").is_none());
        assert_eq!(db.stats().domain_count, 0);
    }

    #[test]
    fn test_rejects_record_without_domains() {
        let mut db = BrandDatabase::new();
        assert!(!db.add(brand("Nameless", &[])));
        assert_eq!(db.stats().brand_count, 0);
    }

    #[test]
    fn test_host_lookup_covers_subdomains() {
        let mut db = BrandDatabase::new();
        db.add(brand("PayBuddy", &["paybuddy.com"]));
        assert!(db.brands_for_host("paybuddy.com").contains("PayBuddy"));
        assert!(db.brands_for_host("login.paybuddy.com").contains("PayBuddy"));
        assert!(db.brands_for_host("paybuddy.com.evil.tk").is_empty());
    }

    #[test]
    fn test_replacing_brand_reindexes_domains() {
        let mut db = BrandDatabase::new();
        db.add(brand("PayBuddy", &["paybuddy.com", "paybuddy.co.uk"]));
        db.add(brand("PayBuddy", &["paybuddy.com"]));
        assert!(db.brands_for_host("paybuddy.co.uk").is_empty());
        assert_eq!(db.stats().brand_count, 1);
    }
}
