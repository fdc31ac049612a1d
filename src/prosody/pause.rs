use crate::segment::{Pause, Word};

/// Quantize a raw inter-word gap onto the break ladder. Gaps under 150ms
/// are treated as articulation, not pauses; longer gaps snap to fixed
/// steps so synthesized breaks stay consistent across a whole video.
pub fn quantize_pause(gap: f64) -> Option<f64> {
    if gap < 0.15 {
        None
    } else if gap < 0.30 {
        Some(0.20)
    } else if gap < 0.60 {
        Some(0.40)
    } else if gap < 1.00 {
        Some(0.70)
    } else {
        // Long pauses keep some of their real length, capped at 1.2s
        Some((gap.min(1.20) * 100.0).round() / 100.0)
    }
}

/// Detect pauses between consecutive aligned words. Each pause is anchored
/// to the index of the word it follows.
pub fn detect_pauses(words: &[Word]) -> Vec<Pause> {
    let mut pauses = Vec::new();
    for (index, pair) in words.windows(2).enumerate() {
        let gap = pair[1].start - pair[0].end;
        if let Some(duration) = quantize_pause(gap) {
            pauses.push(Pause {
                after_index: index,
                duration,
            });
        }
    }
    pauses
}
