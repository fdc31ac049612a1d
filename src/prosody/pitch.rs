use crate::segment::PitchCategory;

/// Frames shorter than this are too small to carry an intonation trend.
const MIN_SLICE_SECONDS: f64 = 0.15;
/// Minimum voiced frames required before a trend is trusted.
const MIN_VOICED_FRAMES: usize = 5;
/// Normalized autocorrelation below this is treated as unvoiced.
const VOICING_THRESHOLD: f64 = 0.5;
/// RMS energy gate; frames quieter than this are skipped.
const ENERGY_FLOOR: f64 = 1e-3;

/// Fundamental-frequency contour of an audio slice via normalized
/// autocorrelation. Frames advance on a 20ms hop over a window of twice
/// the maximum lag; only voiced frames contribute to the contour.
pub fn extract_contour(samples: &[f32], sample_rate: u32, f0_floor: f64, f0_ceil: f64) -> Vec<f64> {
    let rate = sample_rate as f64;
    let min_lag = (rate / f0_ceil).floor() as usize;
    let max_lag = (rate / f0_floor).ceil() as usize;
    if min_lag < 2 || max_lag <= min_lag {
        return Vec::new();
    }

    let window = max_lag;
    let frame = 2 * max_lag;
    let hop = (rate * 0.020).round() as usize;
    if samples.len() < frame || hop == 0 {
        return Vec::new();
    }

    let mut contour = Vec::new();
    let mut offset = 0;
    while offset + frame <= samples.len() {
        let chunk = &samples[offset..offset + frame];
        if rms(&chunk[..window]) >= ENERGY_FLOOR {
            if let Some(f0) = frame_f0(chunk, window, min_lag, max_lag, rate) {
                contour.push(f0);
            }
        }
        offset += hop;
    }
    contour
}

fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|s| (*s as f64) * (*s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

/// Pitch of one frame, or None when unvoiced. The best lag is chosen as
/// the smallest lag within 2% of the global correlation peak, which guards
/// against octave errors on strongly periodic frames.
fn frame_f0(chunk: &[f32], window: usize, min_lag: usize, max_lag: usize, rate: f64) -> Option<f64> {
    let mut scores = vec![0.0f64; max_lag + 1];
    let mut best = 0.0f64;

    for lag in min_lag..=max_lag {
        let mut cross = 0.0f64;
        let mut energy_a = 0.0f64;
        let mut energy_b = 0.0f64;
        for i in 0..window {
            let a = chunk[i] as f64;
            let b = chunk[i + lag] as f64;
            cross += a * b;
            energy_a += a * a;
            energy_b += b * b;
        }
        let denom = (energy_a * energy_b).sqrt();
        let score = if denom > 0.0 { cross / denom } else { 0.0 };
        scores[lag] = score;
        if score > best {
            best = score;
        }
    }

    if best < VOICING_THRESHOLD {
        return None;
    }

    let chosen = (min_lag..=max_lag).find(|&lag| scores[lag] >= best * 0.98)?;
    let refined = refine_lag(&scores, chosen, min_lag, max_lag);
    Some(rate / refined)
}

/// Parabolic interpolation around the chosen lag for sub-sample precision.
fn refine_lag(scores: &[f64], lag: usize, min_lag: usize, max_lag: usize) -> f64 {
    if lag <= min_lag || lag >= max_lag {
        return lag as f64;
    }
    let left = scores[lag - 1];
    let center = scores[lag];
    let right = scores[lag + 1];
    let denom = left - 2.0 * center + right;
    if denom.abs() < f64::EPSILON {
        return lag as f64;
    }
    let shift = 0.5 * (left - right) / denom;
    lag as f64 + shift.clamp(-1.0, 1.0)
}

/// Classify the intonation trend of a voiced contour. The slope is a
/// least-squares fit of raw pitch in Hz against frame index over the
/// middle of the contour (30% to 90% of its indices); the thresholds are
/// in Hz per frame.
pub fn classify_trend(contour: &[f64]) -> PitchCategory {
    if contour.len() < MIN_VOICED_FRAMES {
        return PitchCategory::Neutral;
    }

    let median = median_of(contour);
    if median <= 0.0 {
        return PitchCategory::Neutral;
    }

    let lo = (contour.len() as f64 * 0.30).floor() as usize;
    let hi = ((contour.len() as f64 * 0.90).ceil() as usize).min(contour.len());
    let span = &contour[lo..hi];
    if span.len() < 2 {
        return PitchCategory::Neutral;
    }

    let n = span.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_xy = 0.0;
    for (i, value) in span.iter().enumerate() {
        let x = i as f64;
        let y = *value;
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_xy += x * y;
    }
    let denom = n * sum_xx - sum_x * sum_x;
    let slope = if denom.abs() < f64::EPSILON {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denom
    };

    if slope > 0.1 {
        PitchCategory::Question
    } else if slope < -0.1 {
        PitchCategory::Statement
    } else {
        let max = contour.iter().cloned().fold(f64::MIN, f64::max);
        if max > 1.15 * median {
            PitchCategory::Emphasis
        } else {
            PitchCategory::Neutral
        }
    }
}

/// Classify an audio slice end to end. Slices too short to carry a trend
/// are neutral without analysis.
pub fn classify_slice(
    samples: &[f32],
    sample_rate: u32,
    f0_floor: f64,
    f0_ceil: f64,
) -> PitchCategory {
    let duration = samples.len() as f64 / sample_rate as f64;
    if duration < MIN_SLICE_SECONDS {
        return PitchCategory::Neutral;
    }
    classify_trend(&extract_contour(samples, sample_rate, f0_floor, f0_ceil))
}

fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
