use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::info;

use super::Transcriber;
use crate::config::TranscriberConfig;
use crate::error::{DubflowError, Result};
use crate::segment::{Segment, SegmentFile};

/// JSON output contract of the whisper CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WhisperOutput {
    language: Option<String>,
    duration: Option<f64>,
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
    avg_logprob: Option<f64>,
    no_speech_prob: Option<f64>,
}

/// Transcriber that shells out to a whisper CLI producing JSON output.
pub struct WhisperCliTranscriber {
    config: TranscriberConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn parse_output(&self, json_content: &str) -> Result<SegmentFile> {
        let output: WhisperOutput = serde_json::from_str(json_content)
            .map_err(|e| DubflowError::Transcribe(format!("Failed to parse whisper JSON: {}", e)))?;

        let segments = output
            .segments
            .into_iter()
            .map(|seg| Segment {
                start: seg.start,
                end: seg.end,
                text: seg.text.trim().to_string(),
                words: Vec::new(),
                avg_logprob: seg.avg_logprob,
                no_speech_prob: seg.no_speech_prob,
            })
            .collect();

        Ok(SegmentFile {
            language: output.language,
            duration: output.duration,
            model: Some(self.config.model.clone()),
            segments,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<SegmentFile> {
        info!("Transcribing {} with model {}", audio_path.display(), self.config.model);

        let temp_dir = tempfile::tempdir()
            .map_err(|e| DubflowError::Transcribe(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let output = Command::new(&self.config.binary_path)
            .arg(audio_path)
            .arg("--model")
            .arg(&self.config.model)
            .arg("--language")
            .arg(&self.config.language)
            .arg("--beam_size")
            .arg(self.config.beam_size.to_string())
            .arg("--temperature")
            .arg(self.config.temperature.to_string())
            .arg("--vad_filter")
            .arg("True")
            .arg("--output_format")
            .arg("json")
            .arg("--output_dir")
            .arg(output_dir)
            .output()
            .map_err(|e| DubflowError::Transcribe(format!("Failed to execute whisper: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubflowError::Transcribe(format!("Whisper failed: {}", stderr)));
        }

        let audio_stem = audio_path
            .file_stem()
            .ok_or_else(|| DubflowError::Transcribe("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_stem.to_string_lossy()));

        let json_content = std::fs::read_to_string(&json_file)
            .map_err(|e| DubflowError::Transcribe(format!("Failed to read whisper output: {}", e)))?;

        let transcript = self.parse_output(&json_content)?;
        info!("Transcription produced {} segments", transcript.segments.len());
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_parse_output_maps_segments_and_header() {
        let transcriber = WhisperCliTranscriber::new(Config::default().transcriber);
        let json = r#"{
            "language": "pt",
            "duration": 12.5,
            "segments": [
                {"start": 0.0, "end": 2.4, "text": " Olá, bem-vindos. ", "avg_logprob": -0.2, "no_speech_prob": 0.01},
                {"start": 2.4, "end": 5.0, "text": "Hoje vamos falar de redes."}
            ]
        }"#;

        let file = transcriber.parse_output(json).unwrap();

        assert_eq!(file.language.as_deref(), Some("pt"));
        assert_eq!(file.model.as_deref(), Some("large-v3"));
        assert_eq!(file.segments.len(), 2);
        // Text is trimmed, word lists start empty
        assert_eq!(file.segments[0].text, "Olá, bem-vindos.");
        assert!(file.segments[0].words.is_empty());
        assert_eq!(file.segments[1].avg_logprob, None);
    }

    #[test]
    fn test_parse_output_rejects_malformed_json() {
        let transcriber = WhisperCliTranscriber::new(Config::default().transcriber);
        let result = transcriber.parse_output("not json");
        assert!(matches!(result, Err(DubflowError::Transcribe(_))));
    }
}
