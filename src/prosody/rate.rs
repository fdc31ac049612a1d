/// Speaking rate of a segment in words per second, from the source-side
/// word count. A floor on both operands keeps degenerate segments finite.
pub fn words_per_second(word_count: usize, duration: f64) -> f64 {
    word_count.max(1) as f64 / duration.max(0.01)
}

/// Rate adjustment in percent for an observed speaking rate against the
/// reference band. Inside the band no adjustment is made; outside it, the
/// adjustment grows 6% per word-per-second of excess, capped at ±12%.
pub fn rate_percent(wps: f64, band_low: f64, band_high: f64) -> i32 {
    if wps < band_low {
        ((band_low - wps) * 6.0).floor().min(12.0) as i32
    } else if wps > band_high {
        -(((wps - band_high) * 6.0).floor().min(12.0) as i32)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wps_in_band_needs_no_adjustment() {
        // 7 words over 2 seconds = 3.5 wps, top of band
        let wps = words_per_second(7, 2.0);
        assert_eq!(wps, 3.5);
        assert_eq!(rate_percent(wps, 3.0, 3.5), 0);
    }

    #[test]
    fn test_fast_speech_slows_down_capped() {
        // 7 words over 1 second = 7.0 wps, far above band
        let wps = words_per_second(7, 1.0);
        assert_eq!(rate_percent(wps, 3.0, 3.5), -12);
    }

    #[test]
    fn test_slow_speech_speeds_up() {
        // 2 wps is one below band_low: floor(1.0 * 6) = 6
        assert_eq!(rate_percent(2.0, 3.0, 3.5), 6);
        // Slightly below: floor(0.5 * 6) = 3
        assert_eq!(rate_percent(2.5, 3.0, 3.5), 3);
        // Way below still caps
        assert_eq!(rate_percent(0.1, 3.0, 3.5), 12);
    }

    #[test]
    fn test_degenerate_inputs_stay_finite() {
        assert!(words_per_second(0, 0.0).is_finite());
        // One word over a clamped 10ms floor
        assert_eq!(words_per_second(1, 0.0), 100.0);
    }
}
