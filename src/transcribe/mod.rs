// Speech-to-text and word-alignment stages: thin wrappers over external
// CLI tools with fixed JSON input/output contracts. No control logic here
// beyond invoke, parse, and merge.

pub mod aligner;
pub mod whisper_cli;

use async_trait::async_trait;
use std::path::Path;

pub use aligner::CliWordAligner;
pub use whisper_cli::WhisperCliTranscriber;

use crate::config::{AlignerConfig, TranscriberConfig};
use crate::error::Result;
use crate::segment::SegmentFile;

/// Speech-to-text over a prepared WAV file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<SegmentFile>;
}

/// Per-word timestamp alignment of transcribed segments against audio.
#[async_trait]
pub trait WordAligner: Send + Sync {
    /// Returns the input segments enriched with word-level timing.
    async fn align(&self, audio_path: &Path, transcript: &SegmentFile) -> Result<SegmentFile>;
}

pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create(config: TranscriberConfig) -> Box<dyn Transcriber> {
        Box::new(WhisperCliTranscriber::new(config))
    }
}

pub struct WordAlignerFactory;

impl WordAlignerFactory {
    pub fn create(config: AlignerConfig) -> Box<dyn WordAligner> {
        Box::new(CliWordAligner::new(config))
    }
}
