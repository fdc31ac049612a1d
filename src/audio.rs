use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{DubflowError, Result};

/// Mono audio sample buffer at a fixed sample rate. Loaded once per
/// prosody run and shared read-only across segments.
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Load a WAV file, downmixing to mono and resampling to `target_rate`
    /// when the source rate differs.
    pub fn from_wav_file<P: AsRef<Path>>(path: P, target_rate: u32) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|_| DubflowError::FileNotFound(path.display().to_string()))?;
        Self::from_reader(file, target_rate)
    }

    /// Load WAV data from any reader (used by tests with in-memory fixtures).
    pub fn from_reader<R: Read>(reader: R, target_rate: u32) -> Result<Self> {
        let mut wav = hound::WavReader::new(reader)
            .map_err(|e| DubflowError::Audio(format!("Failed to parse WAV: {}", e)))?;

        let spec = wav.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            return Err(DubflowError::Audio("WAV has zero channels".to_string()));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => wav
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| DubflowError::Audio(format!("Failed to read WAV samples: {}", e)))?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                wav.samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| DubflowError::Audio(format!("Failed to read WAV samples: {}", e)))?
            }
        };

        let mono: Vec<f32> = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        let samples = if spec.sample_rate == target_rate {
            mono
        } else {
            debug!(
                "Resampling audio from {} Hz to {} Hz",
                spec.sample_rate, target_rate
            );
            resample(&mono, spec.sample_rate, target_rate)
        };

        Ok(Self {
            samples,
            sample_rate: target_rate,
        })
    }

    /// Wrap raw mono samples at a known rate.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Slice the buffer by time, clamped to the buffer bounds.
    pub fn slice(&self, start_seconds: f64, end_seconds: f64) -> &[f32] {
        let s = ((start_seconds * self.sample_rate as f64) as usize).min(self.samples.len());
        let e = ((end_seconds * self.sample_rate as f64) as usize)
            .max(s)
            .min(self.samples.len());
        &self.samples[s..e]
    }
}

/// Linear-interpolation resampling.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos.floor() as usize;
            let frac = (pos - idx as f64) as f32;

            if idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                samples[idx] + (samples[idx + 1] - samples[idx]) * frac
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_mono_16k_loads_without_resampling() {
        let data = make_wav(16000, 1, &[0i16, 16384, -16384, 0]);
        let buf = AudioBuffer::from_reader(Cursor::new(data), 16000).unwrap();

        assert_eq!(buf.len(), 4);
        assert!((buf.samples[1] - 0.5).abs() < 1e-3);
        assert!((buf.samples[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_stereo_downmixes_to_mono() {
        // Pairs (100, 300), (-200, 200)
        let data = make_wav(16000, 2, &[100i16, 300, -200, 200]);
        let buf = AudioBuffer::from_reader(Cursor::new(data), 16000).unwrap();

        assert_eq!(buf.len(), 2);
        assert!((buf.samples[0] - 200.0 / 32768.0).abs() < 1e-6);
        assert!(buf.samples[1].abs() < 1e-6);
    }

    #[test]
    fn test_resamples_48k_to_16k() {
        let data = make_wav(48000, 1, &vec![1000i16; 48000]);
        let buf = AudioBuffer::from_reader(Cursor::new(data), 16000).unwrap();

        assert!(buf.len() >= 15900 && buf.len() <= 16100);
        assert!((buf.duration_seconds() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_slice_clamps_to_bounds() {
        let data = make_wav(16000, 1, &vec![0i16; 16000]);
        let buf = AudioBuffer::from_reader(Cursor::new(data), 16000).unwrap();

        assert_eq!(buf.slice(0.0, 0.5).len(), 8000);
        assert_eq!(buf.slice(0.9, 2.0).len(), 1600);
        assert_eq!(buf.slice(5.0, 6.0).len(), 0);
        // Inverted range yields empty, not a panic
        assert_eq!(buf.slice(0.5, 0.2).len(), 0);
    }

    #[test]
    fn test_invalid_wav_is_rejected() {
        let garbage = vec![1u8, 2, 3, 4, 5, 6];
        let result = AudioBuffer::from_reader(Cursor::new(garbage), 16000);
        assert!(matches!(result, Err(DubflowError::Audio(_))));
    }
}
