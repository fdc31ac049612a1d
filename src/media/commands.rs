use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{DubflowError, Result};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    pub fn audio_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-af").arg(filter)
    }

    /// Execute the command, discarding stdout.
    pub async fn execute(&self) -> Result<()> {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .map_err(|e| DubflowError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubflowError::Media(format!(
                "{} failed: {}",
                self.description, stderr
            )));
        }

        Ok(())
    }

    /// Execute the command and return its stdout.
    pub async fn execute_capture(&self) -> Result<String> {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .map_err(|e| DubflowError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubflowError::Media(format!(
                "{} failed: {}",
                self.description, stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Builder for the extraction operations the pipeline needs.
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_binary_path: String,
    sample_rate: u32,
}

impl MediaCommandBuilder {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        binary_path: S1,
        probe_binary_path: S2,
        sample_rate: u32,
    ) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_binary_path: probe_binary_path.into(),
            sample_rate,
        }
    }

    /// Loudness-normalized mono WAV rendering of the video's audio track.
    pub fn extract_normalized_audio<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: P,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Loudness-normalized audio extraction")
            .input(video_path)
            .no_video()
            .audio_filter("loudnorm=I=-23:TP=-2:LRA=11,highpass=f=80,lowpass=f=14000")
            .audio_codec("pcm_s16le")
            .audio_sample_rate(self.sample_rate)
            .audio_channels(1)
            .overwrite()
            .output(audio_path)
    }

    /// Noise-cleaned rendering of an already-normalized WAV.
    pub fn clean_audio<P: AsRef<Path>>(&self, input_path: P, output_path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio noise cleanup")
            .input(input_path)
            .no_video()
            .audio_filter("afftdn=nf=-25,highpass=f=80,lowpass=f=14000,dynaudnorm=f=200:g=15")
            .audio_codec("pcm_s16le")
            .audio_sample_rate(self.sample_rate)
            .audio_channels(1)
            .overwrite()
            .output(output_path)
    }

    /// Container duration query via ffprobe.
    pub fn probe_duration<P: AsRef<Path>>(&self, media_path: P) -> MediaCommand {
        MediaCommand::new(&self.probe_binary_path, "Duration probe")
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .output(media_path)
    }

    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_extraction_carries_loudnorm_filter_graph() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe", 16000);
        let cmd = builder.extract_normalized_audio("in.mp4", "out.wav");

        assert_eq!(cmd.binary_path, "ffmpeg");
        assert!(cmd.args.contains(&"-vn".to_string()));
        assert!(cmd.args.contains(&"-y".to_string()));
        let af_idx = cmd.args.iter().position(|a| a == "-af").unwrap();
        assert!(cmd.args[af_idx + 1].starts_with("loudnorm=I=-23"));
        let ar_idx = cmd.args.iter().position(|a| a == "-ar").unwrap();
        assert_eq!(cmd.args[ar_idx + 1], "16000");
        let ac_idx = cmd.args.iter().position(|a| a == "-ac").unwrap();
        assert_eq!(cmd.args[ac_idx + 1], "1");
    }

    #[test]
    fn test_cleanup_pass_uses_denoise_filter_graph() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe", 16000);
        let cmd = builder.clean_audio("norm.wav", "clean.wav");

        let af_idx = cmd.args.iter().position(|a| a == "-af").unwrap();
        assert!(cmd.args[af_idx + 1].starts_with("afftdn=nf=-25"));
        assert!(cmd.args[af_idx + 1].contains("dynaudnorm=f=200:g=15"));
    }

    #[test]
    fn test_duration_probe_targets_ffprobe() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe", 16000);
        let cmd = builder.probe_duration("in.mp4");

        assert_eq!(cmd.binary_path, "ffprobe");
        assert!(cmd.args.contains(&"format=duration".to_string()));
    }
}
