use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::error::{DubflowError, Result};

/// Base set of infrastructure acronyms protected regardless of glossary
/// content. Matched case-sensitively at word boundaries.
const BASE_ACRONYMS: &[&str] = &[
    "S3", "EC2", "VPC", "CIDR", "IAM", "TLS", "TCP", "UDP", "VPN", "DNS", "NAT", "SLA", "VLAN",
    "SSH", "HTTP", "HTTPS", "ACL",
];

/// Transient mapping from placeholder key to the protected literal it
/// stands for. Scoped to a single translation call; every key inserted
/// must be substituted back before the output is finalized.
#[derive(Debug, Default)]
pub struct PlaceholderMap {
    entries: HashMap<String, String>,
}

impl PlaceholderMap {
    /// Insert a protected value, returning its content-derived key.
    /// Repeated occurrences of the same literal reuse the same key.
    fn put(&mut self, value: &str) -> String {
        let key = placeholder_key(value);
        self.entries.insert(key.clone(), value.to_string());
        key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }
}

/// Deterministic placeholder key for a protected literal. The affix
/// pattern cannot arise from normal tokenization, so a surviving key is
/// always detectable after restoration.
fn placeholder_key(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    format!(
        "__TERM{:02x}{:02x}{:02x}{:02x}__",
        digest[0], digest[1], digest[2], digest[3]
    )
}

/// Replaces IP/CIDR literals, numeric literals, and recognized acronyms
/// with placeholder keys before translation, and restores them after.
pub struct EntityProtector {
    ip_pattern: Regex,
    number_pattern: Regex,
    acronym_patterns: Vec<Regex>,
    leak_pattern: Regex,
}

impl EntityProtector {
    /// Build a protector from the glossary's acronym subset. The glossary
    /// set is unioned with the fixed base set and matched longest-first so
    /// overlapping acronyms cannot corrupt each other.
    pub fn new(glossary_acronyms: &[String]) -> Result<Self> {
        let mut acronyms: Vec<String> = BASE_ACRONYMS.iter().map(|s| s.to_string()).collect();
        for acronym in glossary_acronyms {
            if !acronyms.contains(acronym) {
                acronyms.push(acronym.clone());
            }
        }
        acronyms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut acronym_patterns = Vec::with_capacity(acronyms.len());
        for acronym in &acronyms {
            let pattern = format!(r"\b{}\b", regex::escape(acronym));
            let re = Regex::new(&pattern)
                .map_err(|e| DubflowError::Config(format!("Invalid acronym pattern: {}", e)))?;
            acronym_patterns.push(re);
        }

        Ok(Self {
            ip_pattern: Regex::new(r"\b(\d{1,3}(?:\.\d{1,3}){3})(?:/(\d{1,2}))?\b")
                .expect("static pattern"),
            number_pattern: Regex::new(r"\b\d+[\d\.,/]*\b").expect("static pattern"),
            acronym_patterns,
            leak_pattern: Regex::new(r"__TERM[0-9a-f]{8}__").expect("static pattern"),
        })
    }

    /// Replace protected spans with placeholder keys. IP and numeric
    /// protection run first; acronyms are word-boundary matches and
    /// structurally cannot collide with them.
    pub fn protect(&self, text: &str) -> (String, PlaceholderMap) {
        let mut map = PlaceholderMap::default();

        let text = self
            .ip_pattern
            .replace_all(text, |caps: &regex::Captures| map.put(&caps[0]))
            .to_string();
        let text = self
            .number_pattern
            .replace_all(&text, |caps: &regex::Captures| map.put(&caps[0]))
            .to_string();

        let mut text = text;
        for pattern in &self.acronym_patterns {
            text = pattern
                .replace_all(&text, |caps: &regex::Captures| map.put(&caps[0]))
                .to_string();
        }

        (text, map)
    }

    /// Substitute every placeholder key back to its literal value.
    pub fn restore(&self, text: &str, map: &PlaceholderMap) -> String {
        let mut out = text.to_string();
        for (key, value) in map.iter() {
            out = out.replace(key, value);
        }
        out
    }

    /// True when a placeholder key survives in the text, meaning a backend
    /// corrupted or dropped its counterpart during generation.
    pub fn has_leak(&self, text: &str) -> bool {
        self.leak_pattern.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protector() -> EntityProtector {
        EntityProtector::new(&[]).unwrap()
    }

    #[test]
    fn test_round_trip_is_identity() {
        let p = protector();
        let cases = [
            "",
            "nenhuma entidade aqui",
            "A VPC usa 10.0.0.1/24",
            "portas 80, 443 e 8080 no servidor 192.168.1.1",
            "TCP e UDP sobre TLS na VLAN 100",
            "o bloco 10.0.0.0/16 contém 65536 endereços",
        ];

        for case in cases {
            let (protected, map) = p.protect(case);
            let restored = p.restore(&protected, &map);
            assert_eq!(restored, case, "round trip failed for {:?}", case);
            assert!(!p.has_leak(&restored));
        }
    }

    #[test]
    fn test_protected_text_hides_literals() {
        let p = protector();
        let (protected, map) = p.protect("A VPC usa 10.0.0.1/24");

        assert!(!protected.contains("VPC"));
        assert!(!protected.contains("10.0.0.1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_repeated_literal_reuses_key() {
        let p = protector();
        let (protected, map) = p.protect("de 10.0.0.1 para 10.0.0.1");

        assert_eq!(map.len(), 1);
        let key = placeholder_key("10.0.0.1");
        assert_eq!(protected.matches(&key).count(), 2);
    }

    #[test]
    fn test_distinct_literals_get_distinct_keys() {
        assert_ne!(placeholder_key("10.0.0.1"), placeholder_key("10.0.0.2"));
        assert_ne!(placeholder_key("VPC"), placeholder_key("VPN"));
    }

    #[test]
    fn test_glossary_acronyms_matched_longest_first() {
        let p = EntityProtector::new(&["HTTPS2".to_string()]).unwrap();
        let (protected, map) = p.protect("use HTTPS2 aqui");

        // The longer glossary term wins over the base HTTPS prefix
        assert_eq!(map.len(), 1);
        assert!(!protected.contains("HTTPS2"));
        let restored = p.restore(&protected, &map);
        assert_eq!(restored, "use HTTPS2 aqui");
    }

    #[test]
    fn test_lowercase_words_are_not_acronym_matches() {
        let p = protector();
        let (protected, map) = p.protect("o vpc não conta, a VPC sim");

        assert_eq!(map.len(), 1);
        assert!(protected.contains("vpc"));
    }

    #[test]
    fn test_cidr_suffix_protected_with_address() {
        let p = protector();
        let (_, map) = p.protect("bloco 10.1.2.0/28");
        // One key for the whole IP/CIDR literal, none for the bare suffix
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_leak_detection() {
        let p = protector();
        assert!(p.has_leak("texto com __TERM0a1b2c3d__ sobrando"));
        assert!(!p.has_leak("texto limpo"));
        // Mangled keys no longer match, by design
        assert!(!p.has_leak("__TERM0a1b__"));
    }
}
