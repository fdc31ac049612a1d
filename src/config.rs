use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DubflowError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for intermediate stage artifacts
    pub work_dir: String,
    /// Directory for diagnostic reports
    pub log_dir: String,
    pub media: MediaConfig,
    pub transcriber: TranscriberConfig,
    pub aligner: AlignerConfig,
    pub glossary: GlossaryConfig,
    pub translate: TranslateConfig,
    pub prosody: ProsodyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_binary_path: String,
    /// Sample rate for extracted audio (Hz); the whole pipeline assumes this rate
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to whisper CLI binary
    pub binary_path: String,
    /// Model to use for transcription
    pub model: String,
    /// Source language forced at transcription time
    pub language: String,
    /// Beam size for decoding stability
    pub beam_size: u32,
    /// Decoding temperature
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// Path to the word-alignment CLI binary
    pub binary_path: String,
    /// Language code for the acoustic alignment model
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryConfig {
    /// Path to the find,replace,flags CSV glossary
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Inference endpoint URL for seq2seq generation
    pub endpoint: String,
    /// Primary multilingual model forced into the target language
    pub primary_model: String,
    /// Bilingual fallback model (source→target specialized)
    pub bilingual_model: String,
    /// General many-to-many fallback model
    pub multilingual_model: String,
    /// Source language code (e.g. "pt")
    pub source_language: String,
    /// Target language code (e.g. "en")
    pub target_language: String,
    /// Target language tag understood by the primary model (e.g. "eng_Latn")
    pub target_language_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProsodyConfig {
    /// Lower bound of the reference words-per-second band (0% rate adjustment)
    pub reference_wps_low: f64,
    /// Upper bound of the reference words-per-second band
    pub reference_wps_high: f64,
    /// Pitch search floor (Hz)
    pub f0_floor: f64,
    /// Pitch search ceiling (Hz)
    pub f0_ceil: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "work".to_string(),
            log_dir: "logs".to_string(),
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                probe_binary_path: "ffprobe".to_string(),
                sample_rate: 16000,
            },
            transcriber: TranscriberConfig {
                binary_path: "whisper-ctranslate2".to_string(),
                model: "large-v3".to_string(),
                language: "pt".to_string(),
                beam_size: 5,
                temperature: 0.0,
            },
            aligner: AlignerConfig {
                binary_path: "whisperx-align".to_string(),
                language: "pt".to_string(),
            },
            glossary: GlossaryConfig {
                path: "glossary/terms.csv".to_string(),
            },
            translate: TranslateConfig {
                endpoint: "http://localhost:8000".to_string(),
                primary_model: "facebook/nllb-200-1.3B".to_string(),
                bilingual_model: "Helsinki-NLP/opus-mt-tc-big-pt-en".to_string(),
                multilingual_model: "facebook/m2m100_418M".to_string(),
                source_language: "pt".to_string(),
                target_language: "en".to_string(),
                target_language_tag: "eng_Latn".to_string(),
            },
            prosody: ProsodyConfig {
                reference_wps_low: 3.0,
                reference_wps_high: 3.5,
                f0_floor: 50.0,
                f0_ceil: 300.0,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DubflowError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DubflowError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DubflowError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DubflowError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
