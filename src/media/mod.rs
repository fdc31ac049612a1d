// Audio extraction stage: thin wrapper around ffmpeg/ffprobe.
//
// The pipeline consumes two WAV renderings of each video: a loudness-
// normalized one and a noise-cleaned one. Filter graphs are fixed; this
// module only builds and runs the commands.

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::{MediaCommand, MediaCommandBuilder};
pub use processor::FfmpegAudioExtractor;

use crate::config::MediaConfig;
use crate::error::Result;

/// Audio extraction operations the pipeline depends on.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract a loudness-normalized mono WAV from a video file.
    async fn extract_normalized(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Produce a noise-cleaned rendering of a normalized WAV.
    async fn clean(&self, input_path: &Path, output_path: &Path) -> Result<()>;

    /// Container duration in seconds.
    async fn probe_duration(&self, media_path: &Path) -> Result<f64>;

    /// Check that the underlying binaries are present.
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating audio extractor instances
pub struct AudioExtractorFactory;

impl AudioExtractorFactory {
    pub fn create(config: MediaConfig) -> Box<dyn AudioExtractor> {
        Box::new(FfmpegAudioExtractor::new(config))
    }
}
