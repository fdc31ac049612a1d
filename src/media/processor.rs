use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::info;

use super::{AudioExtractor, MediaCommandBuilder};
use crate::config::MediaConfig;
use crate::error::{DubflowError, Result};

/// FFmpeg-backed audio extractor.
pub struct FfmpegAudioExtractor {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegAudioExtractor {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(
            &config.binary_path,
            &config.probe_binary_path,
            config.sample_rate,
        );

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl AudioExtractor for FfmpegAudioExtractor {
    async fn extract_normalized(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!(
            "Extracting normalized audio from {} to {}",
            video_path.display(),
            audio_path.display()
        );

        let command = self
            .command_builder
            .extract_normalized_audio(video_path, audio_path);
        command.execute().await?;

        info!("Normalized audio extraction completed");
        Ok(())
    }

    async fn clean(&self, input_path: &Path, output_path: &Path) -> Result<()> {
        info!(
            "Cleaning audio {} to {}",
            input_path.display(),
            output_path.display()
        );

        let command = self.command_builder.clean_audio(input_path, output_path);
        command.execute().await?;

        info!("Audio cleanup completed");
        Ok(())
    }

    async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        let command = self.command_builder.probe_duration(media_path);
        let stdout = command.execute_capture().await?;

        stdout
            .trim()
            .parse::<f64>()
            .map_err(|e| DubflowError::Media(format!("Failed to parse probed duration: {}", e)))
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| DubflowError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(DubflowError::Media(
                "Media processor version check failed".to_string(),
            ))
        }
    }
}
