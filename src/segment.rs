use serde::{Deserialize, Serialize};

/// A timestamped word within a segment, produced by alignment.
/// Immutable once created; spans nest within the owning segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A contiguous span of speech. Created by transcription, enriched with
/// words by alignment, text-mutated by normalization, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_logprob: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_speech_prob: Option<f64>,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Persisted JSON shape shared by the STT, aligned, and normalized artifacts.
/// The header fields are written by transcription and carried through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub segments: Vec<Segment>,
}

impl SegmentFile {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            language: None,
            duration: None,
            model: None,
            segments,
        }
    }
}

/// Which translation backend produced a segment's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Primary,
    #[serde(rename = "fallback_1")]
    FallbackBilingual,
    #[serde(rename = "fallback_2")]
    FallbackMultilingual,
    None,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BackendKind::Primary => "primary",
            BackendKind::FallbackBilingual => "fallback_1",
            BackendKind::FallbackMultilingual => "fallback_2",
            BackendKind::None => "none",
        };
        f.write_str(s)
    }
}

/// One translation record per segment. Created once, immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedSegment {
    pub start: f64,
    pub end: f64,
    pub source_text: String,
    pub target_text: String,
    /// (target_len + 1) / (source_len + 1), always > 0
    pub length_ratio: f64,
    /// Detected language of the target text
    pub language: String,
    pub model: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedFile {
    pub segments: Vec<TranslatedSegment>,
}

/// Per-segment entry of the translation diagnostic report. Must be
/// byte-for-byte reproducible given identical inputs and backend outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationReportEntry {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub source_len: usize,
    pub target_len: usize,
    pub length_ratio: f64,
    pub language: String,
    pub language_score: f64,
    pub model: BackendKind,
    pub fallback_used: bool,
    /// True when a backend corrupted or dropped a placeholder key
    pub placeholder_leak: bool,
    pub source: String,
    pub target: String,
}

/// Coarse classification of an utterance's fundamental-frequency trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchCategory {
    Question,
    Statement,
    Emphasis,
    Neutral,
}

impl PitchCategory {
    /// Deterministic pitch-shift directive in semitones.
    pub fn semitones(&self) -> i32 {
        match self {
            PitchCategory::Question => 2,
            PitchCategory::Emphasis => 1,
            PitchCategory::Statement => -1,
            PitchCategory::Neutral => 0,
        }
    }

    /// SSML pitch attribute value, e.g. "+2st", "-1st", "0st".
    pub fn ssml_pitch(&self) -> String {
        let st = self.semitones();
        if st > 0 {
            format!("+{}st", st)
        } else {
            format!("{}st", st)
        }
    }
}

impl std::fmt::Display for PitchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PitchCategory::Question => "question",
            PitchCategory::Statement => "statement",
            PitchCategory::Emphasis => "emphasis",
            PitchCategory::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// A detected inter-word pause, anchored to the source word it follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pause {
    pub after_index: usize,
    /// Quantized duration in seconds
    pub duration: f64,
}

/// One prosody annotation per segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProsodySegment {
    pub start: f64,
    pub end: f64,
    pub target_text: String,
    pub ssml: String,
    pub words_per_second: f64,
    pub rate_percent: i32,
    pub pitch_category: PitchCategory,
    pub pause_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProsodyFile {
    pub segments: Vec<ProsodySegment>,
}

/// Per-segment entry of the prosody diagnostic report. Pauses are capped
/// at the first 8 to bound report size for long segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProsodyReportEntry {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub words_per_second: f64,
    pub rate_percent: i32,
    pub pitch_category: PitchCategory,
    pub pauses: Vec<Pause>,
}

/// Round to 3 decimals for stable report output.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_serializes_to_stable_names() {
        assert_eq!(
            serde_json::to_string(&BackendKind::Primary).unwrap(),
            "\"primary\""
        );
        assert_eq!(
            serde_json::to_string(&BackendKind::FallbackBilingual).unwrap(),
            "\"fallback_1\""
        );
        assert_eq!(
            serde_json::to_string(&BackendKind::FallbackMultilingual).unwrap(),
            "\"fallback_2\""
        );
        assert_eq!(
            serde_json::to_string(&BackendKind::None).unwrap(),
            "\"none\""
        );
    }

    #[test]
    fn test_pitch_category_semitone_mapping() {
        assert_eq!(PitchCategory::Question.ssml_pitch(), "+2st");
        assert_eq!(PitchCategory::Emphasis.ssml_pitch(), "+1st");
        assert_eq!(PitchCategory::Statement.ssml_pitch(), "-1st");
        assert_eq!(PitchCategory::Neutral.ssml_pitch(), "0st");
    }

    #[test]
    fn test_segment_file_parses_without_header_fields() {
        let json = r#"{"segments":[{"start":0.0,"end":1.5,"text":"ola","words":[]}]}"#;
        let file: SegmentFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.segments.len(), 1);
        assert!(file.language.is_none());
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(0.1), 0.1);
    }
}
