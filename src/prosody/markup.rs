use std::collections::BTreeMap;

use crate::segment::{Pause, PitchCategory};

/// One piece of a segment's markup body: either a run of target words or
/// a break between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupPart {
    Text(String),
    /// Break duration in milliseconds
    Break(u32),
}

/// Project a source word index onto the target word sequence by relative
/// position. Degenerate source lengths map to the end of the target.
pub fn project_index(source_index: usize, source_count: usize, target_count: usize) -> usize {
    if target_count == 0 {
        return 0;
    }
    if source_count <= 1 {
        return target_count - 1;
    }
    let ratio = source_index as f64 / (source_count - 1) as f64;
    (ratio * (target_count - 1) as f64).round() as usize
}

/// Split a target text into text runs and breaks. Source-side pauses are
/// projected onto target word boundaries; coinciding projections keep the
/// longest pause, and a break never opens or closes the body, so adjacent
/// breaks cannot occur.
pub fn assemble_parts(target_text: &str, source_word_count: usize, pauses: &[Pause]) -> Vec<MarkupPart> {
    let words: Vec<&str> = target_text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    // Break position -> duration in ms, after the target word at that index
    let mut boundaries: BTreeMap<usize, u32> = BTreeMap::new();
    for pause in pauses {
        let position = project_index(pause.after_index, source_word_count, words.len());
        if position + 1 >= words.len() {
            continue;
        }
        let ms = (pause.duration * 1000.0).round() as u32;
        let entry = boundaries.entry(position).or_insert(0);
        *entry = (*entry).max(ms);
    }

    let mut parts = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    for (index, word) in words.iter().enumerate() {
        run.push(word);
        if let Some(&ms) = boundaries.get(&index) {
            parts.push(MarkupPart::Text(run.join(" ")));
            parts.push(MarkupPart::Break(ms));
            run.clear();
        }
    }
    if !run.is_empty() {
        parts.push(MarkupPart::Text(run.join(" ")));
    }
    parts
}

fn rate_attribute(rate_percent: i32) -> String {
    if rate_percent > 0 {
        format!("+{}%", rate_percent)
    } else if rate_percent < 0 {
        format!("{}%", rate_percent)
    } else {
        "0%".to_string()
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Render the SSML fragment for one segment.
pub fn render_ssml(parts: &[MarkupPart], rate_percent: i32, pitch: PitchCategory) -> String {
    let mut body = String::new();
    for part in parts {
        match part {
            MarkupPart::Text(text) => body.push_str(&escape_text(text)),
            MarkupPart::Break(ms) => body.push_str(&format!("<break time=\"{}ms\"/>", ms)),
        }
    }
    format!(
        "<prosody rate=\"{}\" pitch=\"{}\">{}</prosody>",
        rate_attribute(rate_percent),
        pitch.ssml_pitch(),
        body
    )
}

/// Render the human-readable preview line for one segment, mirroring the
/// SSML structure in plain brackets.
pub fn render_preview(parts: &[MarkupPart], rate_percent: i32, pitch: PitchCategory) -> String {
    let mut out = format!(
        "[prosody rate={} pitch={}]",
        rate_attribute(rate_percent),
        pitch.ssml_pitch()
    );
    for part in parts {
        match part {
            MarkupPart::Text(text) => {
                out.push(' ');
                out.push_str(text);
            }
            MarkupPart::Break(ms) => out.push_str(&format!(" [pause:{}ms]", ms)),
        }
    }
    out
}
