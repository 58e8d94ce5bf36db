//! Offline signal analysis for rendered audio.
//!
//! FFT-based magnitude spectrum with a Hann window, plus level helpers.
//! Used to check what the engine actually produced: which pitches are
//! present and when the output has gone quiet.

use rustfft::{num_complex::Complex, FftPlanner};

/// Magnitude spectrum of one windowed block.
///
/// Magnitudes are scaled so a full-scale sine reads close to its amplitude.
pub struct Spectrum {
    bin_hz: f32,
    magnitudes: Vec<f32>,
}

impl Spectrum {
    /// Analyze `samples` (all of them, as one FFT frame).
    pub fn analyze(samples: &[f32], sample_rate: f32) -> Self {
        let len = samples.len().max(1);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(len);

        // Hann window - reduces spectral leakage
        let window: Vec<f32> = (0..len)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / len as f32).cos()))
            .collect();
        let window_sum: f32 = window.iter().sum::<f32>().max(f32::EPSILON);

        let mut buffer: Vec<Complex<f32>> = (0..len)
            .map(|i| Complex::new(samples.get(i).copied().unwrap_or(0.0) * window[i], 0.0))
            .collect();
        fft.process(&mut buffer);

        let magnitudes = buffer[..len / 2 + 1]
            .iter()
            .map(|c| 2.0 * c.norm() / window_sum)
            .collect();

        Self {
            bin_hz: sample_rate / len as f32,
            magnitudes,
        }
    }

    pub fn bin_hz(&self) -> f32 {
        self.bin_hz
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Frequency of the strongest bin, refined by parabolic interpolation.
    pub fn dominant_frequency(&self) -> Option<f32> {
        let (peak, &magnitude) = self
            .magnitudes
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))?;

        if magnitude <= f32::EPSILON {
            return None;
        }

        let offset = match (self.magnitudes.get(peak - 1), self.magnitudes.get(peak + 1)) {
            (Some(&left), Some(&right)) => {
                let denom = left - 2.0 * magnitude + right;
                if denom.abs() > f32::EPSILON {
                    0.5 * (left - right) / denom
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        Some((peak as f32 + offset) * self.bin_hz)
    }

    /// Strongest magnitude within `tolerance_hz` of `frequency`.
    pub fn magnitude_near(&self, frequency: f32, tolerance_hz: f32) -> f32 {
        let low = ((frequency - tolerance_hz) / self.bin_hz).floor().max(0.0) as usize;
        let high = ((frequency + tolerance_hz) / self.bin_hz).ceil() as usize;

        self.magnitudes
            .iter()
            .take(high + 1)
            .skip(low)
            .fold(0.0, |m, &v| m.max(v))
    }
}

/// Root mean square level.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Largest absolute sample.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0, |m, s| m.max(s.abs()))
}
