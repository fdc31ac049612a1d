/// Lightweight language identification for post-translation checking.
/// Only the distinction "looks like the target language" matters here,
/// so a stopword-profile heuristic is sufficient.
pub trait LanguageDetector: Send + Sync {
    /// Returns (language code, confidence in [0, 1]). Unknown text maps
    /// to ("und", 0.0).
    fn detect(&self, text: &str) -> (String, f64);
}

const EN_STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "is", "are", "was", "were", "of", "to", "in", "on", "for",
    "with", "that", "this", "it", "as", "at", "by", "from", "be", "has", "have", "not", "you",
    "we", "they",
];

const PT_STOPWORDS: &[&str] = &[
    "o", "a", "os", "as", "um", "uma", "e", "ou", "é", "são", "foi", "era", "de", "do", "da",
    "dos", "das", "em", "no", "na", "para", "com", "que", "isso", "como", "por", "se", "não",
    "você", "nós", "eles",
];

/// Stopword-profile detector covering the language pair this pipeline
/// translates between. Accented characters count as a secondary signal
/// for Portuguese.
pub struct HeuristicDetector;

impl HeuristicDetector {
    fn score(words: &[&str], stopwords: &[&str]) -> usize {
        words.iter().filter(|w| stopwords.contains(w)).count()
    }
}

impl LanguageDetector for HeuristicDetector {
    fn detect(&self, text: &str) -> (String, f64) {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return ("und".to_string(), 0.0);
        }

        let en_hits = Self::score(&words, EN_STOPWORDS);
        let mut pt_hits = Self::score(&words, PT_STOPWORDS);

        // Portuguese orthography signal: accented vowels and cedilla
        let accented = lowered
            .chars()
            .filter(|c| "áàâãéêíóôõúç".contains(*c))
            .count();
        pt_hits += accented.min(3);

        let total = words.len() as f64;
        if en_hits == 0 && pt_hits == 0 {
            ("und".to_string(), 0.0)
        } else if en_hits >= pt_hits {
            ("en".to_string(), (en_hits as f64 / total).min(1.0))
        } else {
            ("pt".to_string(), (pt_hits as f64 / total).min(1.0))
        }
    }
}

/// Acceptance test applied to a backend's output. Empty output and short
/// mostly-ASCII fragments (codes, numbers, acronyms) are accepted without
/// a confident detection; otherwise the detected language must match.
pub fn is_target_language_like(text: &str, detected: &str, target: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    if detected == target {
        return true;
    }

    let chars = text.chars().count();
    if chars < 8 {
        let ascii = text.chars().filter(|c| c.is_ascii()).count();
        return ascii as f64 / chars as f64 > 0.95;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_english() {
        let d = HeuristicDetector;
        let (lang, score) = d.detect("the network is configured with a gateway");
        assert_eq!(lang, "en");
        assert!(score > 0.0);
    }

    #[test]
    fn test_detects_portuguese() {
        let d = HeuristicDetector;
        let (lang, _) = d.detect("a rede é configurada com um gateway padrão");
        assert_eq!(lang, "pt");
    }

    #[test]
    fn test_unknown_text_maps_to_und() {
        let d = HeuristicDetector;
        assert_eq!(d.detect("xyzzy plugh 42").0, "und");
        assert_eq!(d.detect("").0, "und");
    }

    #[test]
    fn test_empty_output_is_always_acceptable() {
        assert!(is_target_language_like("", "und", "en"));
    }

    #[test]
    fn test_matching_detection_is_acceptable() {
        assert!(is_target_language_like("the network is up", "en", "en"));
        assert!(!is_target_language_like("a rede está configurada", "pt", "en"));
    }

    #[test]
    fn test_short_ascii_fragments_pass_without_detection() {
        // "VPC 10" has no stopwords but is too short to judge
        assert!(is_target_language_like("VPC 10", "und", "en"));
        // Short but non-ASCII leans foreign
        assert!(!is_target_language_like("não sei", "und", "en"));
    }
}
