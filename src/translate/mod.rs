// Entity-protected machine translation with backend escalation. The
// protect/translate/restore cycle guarantees infrastructure literals
// survive generation verbatim; the escalation chain trades latency for
// output that actually reads as the target language.

pub mod backend;
pub mod entities;
pub mod language;

use tracing::{debug, info, warn};

pub use backend::{build_backend_chain, SeqToSeqBackend, TranslationBackend};
pub use entities::EntityProtector;
pub use language::{is_target_language_like, HeuristicDetector, LanguageDetector};

use regex::Regex;

use crate::error::Result;
use crate::glossary::Glossary;
use crate::segment::{
    round3, BackendKind, SegmentFile, TranslatedFile, TranslatedSegment, TranslationReportEntry,
};

/// Token budget for a source text: a quarter of its character count plus
/// headroom, clamped to [8, 128]. Short segments keep enough room for
/// function words; long ones cannot run away.
pub fn estimate_max_tokens(text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    (chars / 4).max(8).saturating_add(10).min(128)
}

/// Result of one backend attempt, before acceptance is decided.
struct Attempt {
    text: String,
    kind: BackendKind,
    leak: bool,
    language: String,
    language_score: f64,
    passed: bool,
}

/// Translates segments one at a time through an ordered backend chain,
/// protecting entities around each call and holding the best result seen
/// so far. Escalation stops at the first output that reads as the target
/// language; an accepted result is never replaced by a later backend.
pub struct EntityProtectedTranslator {
    backends: Vec<Box<dyn TranslationBackend>>,
    detector: Box<dyn LanguageDetector>,
    protector: EntityProtector,
    punctuation: Regex,
    target_language: String,
}

impl EntityProtectedTranslator {
    pub fn new(
        backends: Vec<Box<dyn TranslationBackend>>,
        detector: Box<dyn LanguageDetector>,
        glossary: &Glossary,
        target_language: &str,
    ) -> Result<Self> {
        Ok(Self {
            backends,
            detector,
            protector: EntityProtector::new(&glossary.acronyms())?,
            punctuation: Regex::new(r"\s+([,\.!\?:;])").expect("static pattern"),
            target_language: target_language.to_string(),
        })
    }

    /// Remove space before punctuation that placeholder restoration or
    /// generation may have introduced.
    fn clean_punctuation(&self, text: &str) -> String {
        self.punctuation.replace_all(text, "$1").trim().to_string()
    }

    async fn attempt(&self, backend: &dyn TranslationBackend, source: &str) -> Result<Attempt> {
        let budget = estimate_max_tokens(source);
        let (protected, map) = self.protector.protect(source);

        let raw = backend.translate(&protected, budget).await?;

        let restored = self.protector.restore(&raw, &map);
        let leak = self.protector.has_leak(&restored);
        let text = self.clean_punctuation(&restored);
        let (language, language_score) = self.detector.detect(&text);
        let passed = !leak && is_target_language_like(&text, &language, &self.target_language);

        Ok(Attempt {
            text,
            kind: backend.kind(),
            leak,
            language,
            language_score,
            passed,
        })
    }

    /// Translate a whole transcript, producing the translated artifact and
    /// its per-segment diagnostic report in one pass.
    pub async fn translate_segments(
        &self,
        input: &SegmentFile,
    ) -> Result<(TranslatedFile, Vec<TranslationReportEntry>)> {
        info!(
            "Translating {} segments through {} backend(s)",
            input.segments.len(),
            self.backends.len()
        );

        let mut segments = Vec::with_capacity(input.segments.len());
        let mut report = Vec::with_capacity(input.segments.len());

        for (index, segment) in input.segments.iter().enumerate() {
            let source = segment.text.trim();

            let held = if source.is_empty() {
                None
            } else {
                self.translate_one(index, source).await
            };

            let (target, kind, language, language_score, leak) = match held {
                Some(attempt) => (
                    attempt.text,
                    attempt.kind,
                    attempt.language,
                    attempt.language_score,
                    attempt.leak,
                ),
                // No output: report the configured target code at zero
                // confidence so the report shape stays uniform
                None => (
                    String::new(),
                    BackendKind::None,
                    self.target_language.clone(),
                    0.0,
                    false,
                ),
            };

            let source_len = source.chars().count();
            let target_len = target.chars().count();
            let length_ratio = if source.is_empty() {
                1.0
            } else {
                round3((target_len as f64 + 1.0) / (source_len as f64 + 1.0))
            };

            report.push(TranslationReportEntry {
                start: round3(segment.start),
                end: round3(segment.end),
                duration: round3(segment.duration()),
                source_len,
                target_len,
                length_ratio,
                language: language.clone(),
                language_score: round3(language_score),
                model: kind,
                fallback_used: !matches!(kind, BackendKind::Primary | BackendKind::None),
                placeholder_leak: leak,
                source: source.to_string(),
                target: target.clone(),
            });

            segments.push(TranslatedSegment {
                start: segment.start,
                end: segment.end,
                source_text: source.to_string(),
                target_text: target,
                length_ratio,
                language,
                model: kind,
            });
        }

        Ok((TranslatedFile { segments }, report))
    }

    /// Run the escalation chain for one segment. The first successful
    /// attempt is held as a best-effort result; a later attempt replaces
    /// it only by passing the acceptance test, and escalation stops there.
    async fn translate_one(&self, index: usize, source: &str) -> Option<Attempt> {
        let mut held: Option<Attempt> = None;

        for backend in &self.backends {
            if held.as_ref().is_some_and(|a| a.passed) {
                break;
            }

            match self.attempt(backend.as_ref(), source).await {
                Ok(attempt) => {
                    debug!(
                        "Segment {}: backend {} produced {:?} (passed: {})",
                        index,
                        attempt.kind,
                        attempt.text,
                        attempt.passed
                    );
                    match &held {
                        None => held = Some(attempt),
                        Some(_) if attempt.passed => held = Some(attempt),
                        Some(_) => {}
                    }
                }
                Err(e) => {
                    warn!("Segment {}: backend {} failed: {}", index, backend.kind(), e);
                }
            }
        }

        if held.is_none() {
            warn!("Segment {}: all backends failed, emitting empty target", index);
        }
        held
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DubflowError;
    use crate::segment::Segment;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticBackend {
        kind: BackendKind,
        output: String,
        calls: Arc<AtomicUsize>,
    }

    impl StaticBackend {
        fn new(kind: BackendKind, output: &str) -> (Box<dyn TranslationBackend>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Box::new(Self {
                    kind,
                    output: output.to_string(),
                    calls: calls.clone(),
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl TranslationBackend for StaticBackend {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn model(&self) -> &str {
            "static"
        }

        async fn translate(&self, _text: &str, _max_new_tokens: u32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    struct IdentityBackend;

    #[async_trait]
    impl TranslationBackend for IdentityBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Primary
        }

        fn model(&self) -> &str {
            "identity"
        }

        async fn translate(&self, text: &str, _max_new_tokens: u32) -> Result<String> {
            Ok(text.to_string())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl TranslationBackend for FailingBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Primary
        }

        fn model(&self) -> &str {
            "failing"
        }

        async fn translate(&self, _text: &str, _max_new_tokens: u32) -> Result<String> {
            Err(DubflowError::Translate("server down".to_string()))
        }
    }

    fn translator(backends: Vec<Box<dyn TranslationBackend>>) -> EntityProtectedTranslator {
        EntityProtectedTranslator::new(
            backends,
            Box::new(HeuristicDetector),
            &Glossary::default(),
            "en",
        )
        .unwrap()
    }

    fn transcript(texts: &[&str]) -> SegmentFile {
        let segments = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Segment {
                start: i as f64,
                end: i as f64 + 1.0,
                text: text.to_string(),
                words: Vec::new(),
                avg_logprob: None,
                no_speech_prob: None,
            })
            .collect();
        SegmentFile::new(segments)
    }

    #[test]
    fn test_token_budget_bounds() {
        assert_eq!(estimate_max_tokens(""), 18);
        assert_eq!(estimate_max_tokens("abc"), 18);
        // 40 chars -> 10 + 10
        assert_eq!(estimate_max_tokens(&"a".repeat(40)), 20);
        // Very long text clamps to 128
        assert_eq!(estimate_max_tokens(&"a".repeat(4000)), 128);
    }

    #[tokio::test]
    async fn test_empty_segment_short_circuits_backends() {
        let (backend, calls) = StaticBackend::new(BackendKind::Primary, "should not run");
        let t = translator(vec![backend]);

        let (file, report) = t.translate_segments(&transcript(&["   "])).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(file.segments[0].target_text, "");
        assert_eq!(file.segments[0].model, BackendKind::None);
        assert_eq!(file.segments[0].length_ratio, 1.0);
        assert!(!report[0].fallback_used);
        assert_eq!(report[0].language, "en");
        assert_eq!(report[0].language_score, 0.0);
    }

    #[tokio::test]
    async fn test_passing_primary_stops_escalation() {
        let (primary, _) = StaticBackend::new(BackendKind::Primary, "the network is ready");
        let (fallback, fallback_calls) =
            StaticBackend::new(BackendKind::FallbackBilingual, "the network is ready now");
        let t = translator(vec![primary, fallback]);

        let (file, report) = t
            .translate_segments(&transcript(&["a rede está pronta"]))
            .await
            .unwrap();

        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
        assert_eq!(file.segments[0].model, BackendKind::Primary);
        assert!(!report[0].fallback_used);
    }

    #[tokio::test]
    async fn test_escalation_replaces_only_on_pass() {
        // Primary emits Portuguese (fails the check), fallback emits English
        let (primary, _) = StaticBackend::new(BackendKind::Primary, "a rede não está funcionando");
        let (fallback, _) =
            StaticBackend::new(BackendKind::FallbackBilingual, "the network is still broken");
        let t = translator(vec![primary, fallback]);

        let (file, report) = t
            .translate_segments(&transcript(&["a rede está quebrada"]))
            .await
            .unwrap();

        assert_eq!(file.segments[0].target_text, "the network is still broken");
        assert_eq!(file.segments[0].model, BackendKind::FallbackBilingual);
        assert!(report[0].fallback_used);
    }

    #[tokio::test]
    async fn test_failing_fallback_keeps_held_result() {
        // Primary output fails the language check but is the only output;
        // the second backend fails outright. The held result survives.
        let (primary, _) = StaticBackend::new(BackendKind::Primary, "ainda em português claro");
        let t = translator(vec![primary, Box::new(FailingBackend)]);

        let (file, _) = t
            .translate_segments(&transcript(&["uma frase de teste"]))
            .await
            .unwrap();

        assert_eq!(file.segments[0].target_text, "ainda em português claro");
        assert_eq!(file.segments[0].model, BackendKind::Primary);
    }

    #[tokio::test]
    async fn test_all_backends_failing_emits_empty_target() {
        let t = translator(vec![Box::new(FailingBackend)]);

        let (file, report) = t
            .translate_segments(&transcript(&["uma frase qualquer"]))
            .await
            .unwrap();

        assert_eq!(file.segments[0].target_text, "");
        assert_eq!(file.segments[0].model, BackendKind::None);
        assert_eq!(report[0].model, BackendKind::None);
    }

    #[tokio::test]
    async fn test_entities_survive_identity_backend() {
        let t = translator(vec![Box::new(IdentityBackend)]);

        let (file, report) = t
            .translate_segments(&transcript(&["A VPC usa 10.0.0.1/24"]))
            .await
            .unwrap();

        assert!(file.segments[0].target_text.contains("VPC"));
        assert!(file.segments[0].target_text.contains("10.0.0.1/24"));
        assert!(!report[0].placeholder_leak);
    }

    #[tokio::test]
    async fn test_punctuation_cleanup_and_ratio() {
        let (primary, _) = StaticBackend::new(BackendKind::Primary, "the link is up , finally .");
        let t = translator(vec![primary]);

        let (file, report) = t
            .translate_segments(&transcript(&["o link subiu, enfim"]))
            .await
            .unwrap();

        assert_eq!(file.segments[0].target_text, "the link is up, finally.");
        // (24 + 1) / (19 + 1)
        assert_eq!(report[0].length_ratio, 1.25);
        assert!(report[0].length_ratio > 0.0);
    }
}
