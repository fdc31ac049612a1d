use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::Result;
use crate::segment::{Segment, SegmentFile, TranslatedFile, Word};

const MAX_CUE_CHARS: usize = 42;
const MAX_CUE_SECONDS: f64 = 6.0;
const MIN_CUE_SECONDS: f64 = 1.0;

/// Re-partition word-aligned segments into readable subtitle cues. A cue
/// closes when adding the next word would exceed 42 characters or 6
/// seconds; cues shorter than 1 second are padded to it. Segments without
/// word timing pass through unchanged.
pub fn split_for_srt(transcript: &SegmentFile) -> SegmentFile {
    let mut out = transcript.clone();
    out.segments = transcript
        .segments
        .iter()
        .flat_map(|segment| {
            if segment.words.is_empty() {
                vec![segment.clone()]
            } else {
                split_segment(segment)
            }
        })
        .collect();
    out
}

fn split_segment(segment: &Segment) -> Vec<Segment> {
    let mut cues = Vec::new();
    let mut run: Vec<&Word> = Vec::new();
    let mut run_chars = 0usize;

    let flush = |run: &mut Vec<&Word>, cues: &mut Vec<Segment>| {
        if run.is_empty() {
            return;
        }
        let start = run[0].start;
        let end = run[run.len() - 1].end.max(start + MIN_CUE_SECONDS);
        let text = run.iter().map(|w| w.word.trim()).collect::<Vec<_>>().join(" ");
        cues.push(Segment {
            start,
            end,
            text,
            words: run.iter().map(|w| (*w).clone()).collect(),
            avg_logprob: segment.avg_logprob,
            no_speech_prob: segment.no_speech_prob,
        });
        run.clear();
    };

    for word in &segment.words {
        let word_chars = word.word.trim().chars().count();
        let would_overflow = !run.is_empty()
            && (run_chars + 1 + word_chars > MAX_CUE_CHARS
                || word.end - run[0].start > MAX_CUE_SECONDS);
        if would_overflow {
            flush(&mut run, &mut cues);
            run_chars = 0;
        }
        run_chars += if run.is_empty() { word_chars } else { 1 + word_chars };
        run.push(word);
    }
    flush(&mut run, &mut cues);
    cues
}

/// Generate an SRT subtitle file from a transcript.
pub async fn generate_srt<P: AsRef<Path>>(transcript: &SegmentFile, output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    let mut srt_content = String::new();

    for (index, segment) in transcript.segments.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(segment.start),
            format_srt_time(segment.end),
            segment.text.trim()
        ));
    }

    fs::write(output_path, srt_content).await?;
    Ok(())
}

/// Generate an SRT file carrying translated text on the source timings.
pub async fn generate_translation_srt<P: AsRef<Path>>(
    translated: &TranslatedFile,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating translation SRT file: {}", output_path.display());

    let mut srt_content = String::new();

    for (index, segment) in translated.segments.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(segment.start),
            format_srt_time(segment.end),
            segment.target_text.trim()
        ));
    }

    fs::write(output_path, srt_content).await?;
    Ok(())
}

/// Write prosody preview lines as an SRT file on the source timings, one
/// cue per segment, for eyeballing markup against the video.
pub async fn generate_preview_srt<P: AsRef<Path>>(
    transcript: &SegmentFile,
    previews: &[String],
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating prosody preview SRT file: {}", output_path.display());

    let mut srt_content = String::new();

    for (index, (segment, preview)) in transcript.segments.iter().zip(previews).enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(segment.start),
            format_srt_time(segment.end),
            preview
        ));
    }

    fs::write(output_path, srt_content).await?;
    Ok(())
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0) as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
