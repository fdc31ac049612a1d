use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::info;

use super::WordAligner;
use crate::config::AlignerConfig;
use crate::error::{DubflowError, Result};
use crate::segment::SegmentFile;

/// Word aligner that shells out to an alignment CLI. The tool receives the
/// transcript JSON and the audio path, and returns the same segment list
/// with per-word timestamps filled in.
pub struct CliWordAligner {
    config: AlignerConfig,
}

impl CliWordAligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }

    /// Merge aligned word lists back into the source transcript. Segment
    /// counts must match; the aligner is not allowed to re-segment.
    fn merge(&self, transcript: &SegmentFile, aligned: SegmentFile) -> Result<SegmentFile> {
        if transcript.segments.len() != aligned.segments.len() {
            return Err(DubflowError::Align(format!(
                "Aligner returned {} segments for {} inputs",
                aligned.segments.len(),
                transcript.segments.len()
            )));
        }

        let mut merged = transcript.clone();
        for (seg, aligned_seg) in merged.segments.iter_mut().zip(aligned.segments) {
            seg.words = aligned_seg.words;
        }
        Ok(merged)
    }
}

#[async_trait]
impl WordAligner for CliWordAligner {
    async fn align(&self, audio_path: &Path, transcript: &SegmentFile) -> Result<SegmentFile> {
        info!("Aligning {} segments against {}", transcript.segments.len(), audio_path.display());

        let temp_dir = tempfile::tempdir()
            .map_err(|e| DubflowError::Align(format!("Failed to create temp directory: {}", e)))?;
        let input_file = temp_dir.path().join("segments.json");
        let output_file = temp_dir.path().join("aligned.json");

        let input_json = serde_json::to_string(transcript)?;
        std::fs::write(&input_file, input_json)
            .map_err(|e| DubflowError::Align(format!("Failed to write aligner input: {}", e)))?;

        let output = Command::new(&self.config.binary_path)
            .arg("--audio")
            .arg(audio_path)
            .arg("--segments")
            .arg(&input_file)
            .arg("--language")
            .arg(&self.config.language)
            .arg("--output")
            .arg(&output_file)
            .output()
            .map_err(|e| DubflowError::Align(format!("Failed to execute aligner: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubflowError::Align(format!("Aligner failed: {}", stderr)));
        }

        let json_content = std::fs::read_to_string(&output_file)
            .map_err(|e| DubflowError::Align(format!("Failed to read aligner output: {}", e)))?;
        let aligned: SegmentFile = serde_json::from_str(&json_content)
            .map_err(|e| DubflowError::Align(format!("Failed to parse aligner JSON: {}", e)))?;

        let merged = self.merge(transcript, aligned)?;
        info!("Alignment completed");
        Ok(merged)
    }
}
