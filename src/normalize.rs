use regex::Regex;
use tracing::info;

use crate::error::{DubflowError, Result};
use crate::glossary::Glossary;
use crate::segment::SegmentFile;

/// Deterministic transcript cleanup: sentence-start truecasing, repair of
/// spoken-form IP addresses and CIDR suffixes, unit normalization, and
/// glossary substitution. Runs after alignment so word timing is preserved
/// untouched; only segment text is rewritten.
pub struct TextNormalizer {
    spoken_dot: Regex,
    spoken_slash: Regex,
    dot_spacing: Regex,
    slash_spacing: Regex,
    ghz_decimal: Regex,
    glossary_rules: Vec<(Regex, String)>,
}

impl TextNormalizer {
    pub fn new(glossary: &Glossary) -> Result<Self> {
        let mut glossary_rules = Vec::new();
        for entry in glossary.entries() {
            let pattern = if entry.case_insensitive {
                format!("(?i){}", regex::escape(&entry.find))
            } else {
                regex::escape(&entry.find)
            };
            let re = Regex::new(&pattern)
                .map_err(|e| DubflowError::Config(format!("Invalid glossary pattern: {}", e)))?;
            glossary_rules.push((re, entry.replace.clone()));
        }

        Ok(Self {
            spoken_dot: Regex::new(r"(?i)\bponto\b").expect("static pattern"),
            spoken_slash: Regex::new(r"(?i)\bbarra\s*(\d{1,2})\b").expect("static pattern"),
            dot_spacing: Regex::new(r"\s*\.\s*(\d)").expect("static pattern"),
            slash_spacing: Regex::new(r"\s+/(\d)").expect("static pattern"),
            ghz_decimal: Regex::new(r"(?i)\b(\d+)\s*(ghz)\b").expect("static pattern"),
            glossary_rules,
        })
    }

    pub fn normalize_segments(&self, input: &SegmentFile) -> SegmentFile {
        info!("Normalizing {} segments", input.segments.len());

        let mut output = input.clone();
        for segment in &mut output.segments {
            segment.text = self.normalize_text(&segment.text);
        }
        output
    }

    pub fn normalize_text(&self, text: &str) -> String {
        let text = truecase(text);
        let text = self.repair_spoken_ips(&text);
        let text = self.normalize_units(&text);
        self.apply_glossary(&text).trim().to_string()
    }

    /// Repair spoken IP/CIDR forms: "10 ponto 0 ponto 0 ponto 1 barra 24"
    /// becomes "10.0.0.1/24".
    fn repair_spoken_ips(&self, text: &str) -> String {
        let text = self.spoken_dot.replace_all(text, ".");
        let text = self.spoken_slash.replace_all(&text, "/$1");
        // Collapse spacing around dots and CIDR slashes that precede digits
        let text = self.dot_spacing.replace_all(&text, ".$1");
        self.slash_spacing.replace_all(&text, "/$1").to_string()
    }

    fn normalize_units(&self, text: &str) -> String {
        let text = self.ghz_decimal.replace_all(text, "$1,0 GHz").to_string();
        text.replace(" gigahertz", " GHz")
            .replace(" megahertz", " MHz")
            .replace(" gigabytes", " GB")
            .replace(" gigabyte", " GB")
            .replace(" megabytes", " MB")
            .replace(" megabyte", " MB")
    }

    fn apply_glossary(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (pattern, replacement) in &self.glossary_rules {
            out = pattern.replace_all(&out, replacement.as_str()).to_string();
        }
        out
    }
}

/// Capitalize the first character as a fallback when no punctuation model
/// is in play.
fn truecase(text: &str) -> String {
    let text = text.trim();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::Glossary;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(&Glossary::default()).unwrap()
    }

    #[test]
    fn test_spoken_ip_repair() {
        let n = normalizer();
        assert_eq!(
            n.normalize_text("a rede é 10 ponto 0 ponto 0 ponto 1 barra 24"),
            "A rede é 10.0.0.1/24"
        );
    }

    #[test]
    fn test_spoken_dot_is_case_insensitive() {
        let n = normalizer();
        assert_eq!(n.normalize_text("10 Ponto 1"), "10.1");
    }

    #[test]
    fn test_unit_normalization() {
        let n = normalizer();
        assert_eq!(n.normalize_text("dois gigabytes de memória"), "Dois GB de memória");
        assert_eq!(n.normalize_text("clock de 3 ghz"), "Clock de 3,0 GHz");
    }

    #[test]
    fn test_truecase_only_touches_first_char() {
        let n = normalizer();
        assert_eq!(n.normalize_text("olá Mundo"), "Olá Mundo");
        assert_eq!(n.normalize_text(""), "");
    }

    #[test]
    fn test_glossary_substitution_with_case_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terms.csv");
        std::fs::write(&path, "kubernetes,Kubernetes,i\nvpc,VPC,i\n").unwrap();
        let glossary = Glossary::load(&path).unwrap();
        let n = TextNormalizer::new(&glossary).unwrap();

        assert_eq!(
            n.normalize_text("o KUBERNETES usa uma vpc"),
            "O Kubernetes usa uma VPC"
        );
    }
}
