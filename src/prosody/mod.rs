// Prosody transfer: read timing and intonation off the source audio and
// re-express them as SSML directives over the translated text. Everything
// here is deterministic; identical inputs produce identical markup.

pub mod markup;
pub mod pause;
pub mod pitch;
pub mod rate;

use tracing::info;

pub use markup::{assemble_parts, render_preview, render_ssml, MarkupPart};
pub use pause::{detect_pauses, quantize_pause};
pub use pitch::{classify_slice, classify_trend, extract_contour};
pub use rate::{rate_percent, words_per_second};

use crate::audio::AudioBuffer;
use crate::config::ProsodyConfig;
use crate::error::{DubflowError, Result};
use crate::segment::{
    round3, ProsodyFile, ProsodyReportEntry, ProsodySegment, SegmentFile, TranslatedFile,
};

/// Pauses recorded per report entry are capped to bound report size.
const REPORT_PAUSE_CAP: usize = 8;

/// Everything the prosody stage produces for one transcript.
pub struct ProsodyOutput {
    pub file: ProsodyFile,
    pub report: Vec<ProsodyReportEntry>,
    pub previews: Vec<String>,
}

/// Combines source-side timing (aligned words, clean audio) with the
/// translated text to produce per-segment SSML. The aligned and translated
/// segment lists must correspond one to one; a mismatch aborts before any
/// output is produced.
pub struct ProsodyMarkupSynthesizer {
    config: ProsodyConfig,
}

impl ProsodyMarkupSynthesizer {
    pub fn new(config: ProsodyConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(
        &self,
        aligned: &SegmentFile,
        translated: &TranslatedFile,
        audio: &AudioBuffer,
    ) -> Result<ProsodyOutput> {
        if aligned.segments.len() != translated.segments.len() {
            return Err(DubflowError::SegmentMismatch {
                aligned: aligned.segments.len(),
                translated: translated.segments.len(),
            });
        }

        info!("Synthesizing prosody markup for {} segments", aligned.segments.len());

        let mut segments = Vec::with_capacity(aligned.segments.len());
        let mut report = Vec::with_capacity(aligned.segments.len());
        let mut previews = Vec::with_capacity(aligned.segments.len());

        for (index, (source, target)) in aligned
            .segments
            .iter()
            .zip(&translated.segments)
            .enumerate()
        {
            let duration = source.duration();
            let pauses = detect_pauses(&source.words);

            let source_word_count = if source.words.is_empty() {
                source.text.split_whitespace().count()
            } else {
                source.words.len()
            };

            // Speaking rate is measured on the source performance; the
            // target text only receives the directive
            let wps = words_per_second(source_word_count, duration);
            let rate = rate_percent(wps, self.config.reference_wps_low, self.config.reference_wps_high);

            let slice = audio.slice(source.start, source.end);
            let pitch = classify_slice(
                slice,
                audio.sample_rate(),
                self.config.f0_floor,
                self.config.f0_ceil,
            );
            let parts = assemble_parts(&target.target_text, source_word_count, &pauses);
            let ssml = render_ssml(&parts, rate, pitch);
            previews.push(render_preview(&parts, rate, pitch));

            report.push(ProsodyReportEntry {
                index,
                start: round3(source.start),
                end: round3(source.end),
                duration: round3(duration),
                words_per_second: round3(wps),
                rate_percent: rate,
                pitch_category: pitch,
                pauses: pauses.iter().take(REPORT_PAUSE_CAP).cloned().collect(),
            });

            segments.push(ProsodySegment {
                start: source.start,
                end: source.end,
                target_text: target.target_text.clone(),
                ssml,
                words_per_second: round3(wps),
                rate_percent: rate,
                pitch_category: pitch,
                pause_count: pauses.len(),
            });
        }

        Ok(ProsodyOutput {
            file: ProsodyFile { segments },
            report,
            previews,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::segment::{BackendKind, PitchCategory, Segment, TranslatedSegment, Word};

    fn synthesizer() -> ProsodyMarkupSynthesizer {
        ProsodyMarkupSynthesizer::new(Config::default().prosody)
    }

    fn word(text: &str, start: f64, end: f64) -> Word {
        Word { word: text.to_string(), start, end, score: None }
    }

    fn aligned_segment(start: f64, end: f64, text: &str, words: Vec<Word>) -> Segment {
        Segment {
            start,
            end,
            text: text.to_string(),
            words,
            avg_logprob: None,
            no_speech_prob: None,
        }
    }

    fn translated_segment(start: f64, end: f64, target: &str) -> TranslatedSegment {
        TranslatedSegment {
            start,
            end,
            source_text: String::new(),
            target_text: target.to_string(),
            length_ratio: 1.0,
            language: "en".to_string(),
            model: BackendKind::Primary,
        }
    }

    fn silent_audio(seconds: f64) -> AudioBuffer {
        AudioBuffer::from_samples(vec![0.0; (seconds * 16000.0) as usize], 16000)
    }

    #[test]
    fn test_segment_count_mismatch_is_fatal() {
        let aligned = SegmentFile::new(vec![aligned_segment(0.0, 1.0, "a", vec![])]);
        let translated = TranslatedFile { segments: vec![] };

        let result = synthesizer().synthesize(&aligned, &translated, &silent_audio(2.0));
        assert!(matches!(
            result,
            Err(DubflowError::SegmentMismatch { aligned: 1, translated: 0 })
        ));
    }

    #[test]
    fn test_markup_carries_pause_and_rate() {
        // Two source words with a 450ms gap; two target words over 2s
        let words = vec![word("olá", 0.0, 0.5), word("mundo", 0.95, 1.9)];
        let aligned = SegmentFile::new(vec![aligned_segment(0.0, 2.0, "olá mundo", words)]);
        let translated = TranslatedFile {
            segments: vec![translated_segment(0.0, 2.0, "hello world")],
        };

        let output = synthesizer()
            .synthesize(&aligned, &translated, &silent_audio(2.0))
            .unwrap();

        let segment = &output.file.segments[0];
        assert_eq!(segment.pause_count, 1);
        assert!(segment.ssml.contains("<break time=\"400ms\"/>"));
        // 2 words / 2 seconds = 1 wps, far below the band, capped speedup
        assert_eq!(segment.rate_percent, 12);
        // Silent audio has no voiced frames
        assert_eq!(segment.pitch_category, PitchCategory::Neutral);
        assert_eq!(output.previews.len(), 1);
        assert!(output.previews[0].contains("[pause:400ms]"));
    }

    #[test]
    fn test_rate_follows_source_words_not_target_length() {
        // 7 source words over 2 seconds sit at the top of the reference
        // band; a terse 2-word translation must not change that
        let words: Vec<Word> = (0..7)
            .map(|i| {
                let start = i as f64 * 2.0 / 7.0;
                word(&format!("palavra{}", i), start, start + 0.2)
            })
            .collect();
        let aligned = SegmentFile::new(vec![aligned_segment(0.0, 2.0, "sete palavras", words)]);
        let translated = TranslatedFile {
            segments: vec![translated_segment(0.0, 2.0, "seven words")],
        };

        let output = synthesizer()
            .synthesize(&aligned, &translated, &silent_audio(2.0))
            .unwrap();

        assert_eq!(output.file.segments[0].words_per_second, 3.5);
        assert_eq!(output.file.segments[0].rate_percent, 0);
        assert_eq!(output.report[0].words_per_second, 3.5);
    }

    #[test]
    fn test_empty_target_produces_empty_body() {
        let aligned = SegmentFile::new(vec![aligned_segment(0.0, 1.0, "olá", vec![])]);
        let translated = TranslatedFile {
            segments: vec![translated_segment(0.0, 1.0, "")],
        };

        let output = synthesizer()
            .synthesize(&aligned, &translated, &silent_audio(1.0))
            .unwrap();

        assert_eq!(
            output.file.segments[0].ssml,
            "<prosody rate=\"+12%\" pitch=\"0st\"></prosody>"
        );
    }

    #[test]
    fn test_report_pause_cap() {
        // 10 gaps of 400ms each
        let mut words = Vec::new();
        let mut t = 0.0;
        for i in 0..11 {
            words.push(word(&format!("w{}", i), t, t + 0.2));
            t += 0.6;
        }
        let end = t;
        let aligned = SegmentFile::new(vec![aligned_segment(0.0, end, "x", words)]);
        let translated = TranslatedFile {
            segments: vec![translated_segment(0.0, end, "some words here")],
        };

        let output = synthesizer()
            .synthesize(&aligned, &translated, &silent_audio(end))
            .unwrap();

        assert_eq!(output.file.segments[0].pause_count, 10);
        assert_eq!(output.report[0].pauses.len(), 8);
    }
}
