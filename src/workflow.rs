use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::audio::AudioBuffer;
use crate::config::Config;
use crate::error::{DubflowError, Result};
use crate::glossary::Glossary;
use crate::media::{AudioExtractor, AudioExtractorFactory};
use crate::normalize::TextNormalizer;
use crate::prosody::ProsodyMarkupSynthesizer;
use crate::segment::{SegmentFile, TranslatedFile};
use crate::subtitle::{generate_preview_srt, generate_srt, generate_translation_srt, split_for_srt};
use crate::transcribe::{Transcriber, TranscriberFactory, WordAligner, WordAlignerFactory};
use crate::translate::{build_backend_chain, EntityProtectedTranslator, HeuristicDetector};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

/// Canonical per-video artifact paths under the work directory. Every
/// stage reads its input from and commits its output to these locations,
/// so stages can be re-run individually.
pub struct StagePaths {
    pub normalized_audio: PathBuf,
    pub clean_audio: PathBuf,
    pub transcript: PathBuf,
    pub aligned: PathBuf,
    pub normalized_transcript: PathBuf,
    pub transcript_srt: PathBuf,
    pub translated: PathBuf,
    pub translated_srt: PathBuf,
    pub translation_report: PathBuf,
    pub prosody: PathBuf,
    pub prosody_preview_srt: PathBuf,
    pub prosody_report: PathBuf,
}

/// End-to-end dubbing preparation pipeline. Owns the external-tool
/// collaborators; translation backends are built lazily per run because
/// they hold live HTTP state.
pub struct Workflow {
    config: Config,
    extractor: Box<dyn AudioExtractor>,
    transcriber: Box<dyn Transcriber>,
    aligner: Box<dyn WordAligner>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let extractor = AudioExtractorFactory::create(config.media.clone());
        let transcriber = TranscriberFactory::create(config.transcriber.clone());
        let aligner = WordAlignerFactory::create(config.aligner.clone());

        extractor.check_availability()?;

        Ok(Self {
            config,
            extractor,
            transcriber,
            aligner,
        })
    }

    /// Compute the artifact layout for one input video.
    pub fn stage_paths(&self, input_path: &Path) -> Result<StagePaths> {
        let stem = input_path
            .file_stem()
            .ok_or_else(|| DubflowError::Config("Cannot determine input file stem".to_string()))?
            .to_string_lossy()
            .to_string();

        let work = Path::new(&self.config.work_dir);
        let audio = work.join("audio");
        let stt = work.join("stt");
        let mt = work.join("mt");
        let ssml = work.join("ssml");

        Ok(StagePaths {
            normalized_audio: audio.join(format!("{}_16k_mono.wav", stem)),
            clean_audio: audio.join(format!("{}_clean.wav", stem)),
            transcript: stt.join(format!("{}_stt.json", stem)),
            aligned: stt.join(format!("{}_words_aligned.json", stem)),
            normalized_transcript: stt.join(format!("{}_clean.json", stem)),
            transcript_srt: stt.join(format!("{}_source.srt", stem)),
            translated: mt.join(format!("{}_translated.json", stem)),
            translated_srt: mt.join(format!("{}_translated.srt", stem)),
            translation_report: mt.join(format!("{}_mt_report.json", stem)),
            prosody: ssml.join(format!("{}_ssml.json", stem)),
            prosody_preview_srt: ssml.join(format!("{}_ssml_preview.srt", stem)),
            prosody_report: ssml.join(format!("{}_ssml_report.json", stem)),
        })
    }

    async fn ensure_work_dirs(&self) -> Result<()> {
        let work = Path::new(&self.config.work_dir);
        for sub in ["audio", "stt", "mt", "ssml"] {
            fs::create_dir_all(work.join(sub)).await?;
        }
        Ok(())
    }

    /// Run the whole pipeline for one video file.
    pub async fn process_single_file(&self, input_path: &Path) -> Result<()> {
        info!("Processing single file: {}", input_path.display());

        if !input_path.exists() {
            return Err(DubflowError::FileNotFound(input_path.display().to_string()));
        }

        self.ensure_work_dirs().await?;
        let paths = self.stage_paths(input_path)?;

        self.run_extract(input_path, &paths.normalized_audio, &paths.clean_audio)
            .await?;
        let transcript = self
            .run_transcribe(&paths.normalized_audio, &paths.transcript)
            .await?;
        let aligned = self
            .run_align(&paths.normalized_audio, &transcript, &paths.aligned)
            .await?;
        let normalized = self
            .run_normalize(&aligned, &paths.normalized_transcript, &paths.transcript_srt)
            .await?;
        let translated = self
            .run_translate(
                &normalized,
                &paths.translated,
                &paths.translated_srt,
                &paths.translation_report,
            )
            .await?;
        self.run_prosody(
            &normalized,
            &translated,
            &paths.clean_audio,
            &paths.prosody,
            &paths.prosody_preview_srt,
            &paths.prosody_report,
        )
        .await?;

        info!("Pipeline completed for {}", input_path.display());
        Ok(())
    }

    /// Run the pipeline over every video file under a directory. One file
    /// failing does not stop the batch.
    pub async fn process_directory(&self, input_dir: &Path) -> Result<()> {
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(DubflowError::Config("Input path is not a directory".to_string()));
        }

        let mut video_files = Vec::new();
        for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
            if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
                if VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                    video_files.push(entry.path().to_path_buf());
                }
            }
        }

        info!("Found {} video files to process", video_files.len());

        let progress = ProgressBar::new(video_files.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        for video_path in video_files {
            progress.set_message(
                video_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );
            match self.process_single_file(&video_path).await {
                Ok(_) => info!("Successfully processed: {}", video_path.display()),
                Err(e) => warn!("Failed to process {}: {}", video_path.display(), e),
            }
            progress.inc(1);
        }
        progress.finish_with_message("done");

        Ok(())
    }

    /// Stage 1: extract the normalized and cleaned audio renderings.
    pub async fn run_extract(
        &self,
        video_path: &Path,
        normalized_path: &Path,
        clean_path: &Path,
    ) -> Result<()> {
        if let Some(parent) = normalized_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        self.extractor
            .extract_normalized(video_path, normalized_path)
            .await?;
        self.extractor.clean(normalized_path, clean_path).await?;

        let duration = self.extractor.probe_duration(video_path).await?;
        info!("Extracted audio for {:.1}s of media", duration);
        Ok(())
    }

    /// Stage 2: transcribe the normalized audio.
    pub async fn run_transcribe(&self, audio_path: &Path, output: &Path) -> Result<SegmentFile> {
        let transcript = self.transcriber.transcribe(audio_path).await?;
        write_json(output, &transcript).await?;
        Ok(transcript)
    }

    /// Stage 3: align words against the audio.
    pub async fn run_align(
        &self,
        audio_path: &Path,
        transcript: &SegmentFile,
        output: &Path,
    ) -> Result<SegmentFile> {
        let aligned = self.aligner.align(audio_path, transcript).await?;
        write_json(output, &aligned).await?;
        Ok(aligned)
    }

    /// Stage 4: deterministic text normalization, plus a source SRT for
    /// spot-checking the transcript.
    pub async fn run_normalize(
        &self,
        aligned: &SegmentFile,
        output: &Path,
        srt_output: &Path,
    ) -> Result<SegmentFile> {
        let glossary = Glossary::load(&self.config.glossary.path)?;
        let normalizer = TextNormalizer::new(&glossary)?;
        let normalized = normalizer.normalize_segments(aligned);

        write_json(output, &normalized).await?;
        generate_srt(&split_for_srt(&normalized), srt_output).await?;
        Ok(normalized)
    }

    /// Stage 5: entity-protected translation with backend escalation.
    pub async fn run_translate(
        &self,
        transcript: &SegmentFile,
        output: &Path,
        srt_output: &Path,
        report_output: &Path,
    ) -> Result<TranslatedFile> {
        let glossary = Glossary::load(&self.config.glossary.path)?;
        let backends = build_backend_chain(&self.config.translate).await?;
        let translator = EntityProtectedTranslator::new(
            backends,
            Box::new(HeuristicDetector),
            &glossary,
            &self.config.translate.target_language,
        )?;

        let (translated, report) = translator.translate_segments(transcript).await?;

        write_json(output, &translated).await?;
        write_json(report_output, &report).await?;
        generate_translation_srt(&translated, srt_output).await?;
        Ok(translated)
    }

    /// Stage 6: prosody markup synthesis over the clean audio rendering.
    pub async fn run_prosody(
        &self,
        aligned: &SegmentFile,
        translated: &TranslatedFile,
        clean_audio_path: &Path,
        output: &Path,
        preview_output: &Path,
        report_output: &Path,
    ) -> Result<()> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).await?;
        }

        let audio = AudioBuffer::from_wav_file(clean_audio_path, self.config.media.sample_rate)?;
        let synthesizer = ProsodyMarkupSynthesizer::new(self.config.prosody.clone());
        let result = synthesizer.synthesize(aligned, translated, &audio)?;

        write_json(output, &result.file).await?;
        write_json(report_output, &result.report).await?;
        generate_preview_srt(aligned, &result.previews, preview_output).await?;
        Ok(())
    }
}

/// Commit a stage artifact as pretty-printed JSON.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).await?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Load a stage artifact back from JSON.
pub async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(DubflowError::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}
