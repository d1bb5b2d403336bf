//! # Pitch Detection Module
//!
//! Fundamental frequency estimation for sung or played single notes using
//! normalized autocorrelation.
//!
//! ## Algorithm
//! 1. Silence gate on the window RMS
//! 2. Trim the loud edges of the window so it starts and ends near a zero crossing
//! 3. Autocorrelation of the trimmed buffer (FFT accelerated)
//! 4. Walk down from lag 0 to the first local minimum, then take the global
//!    maximum after it, so the zero-lag peak is never selected
//! 5. Parabolic interpolation for sub-sample accuracy
//! 6. Range and confidence gates

use crate::autocorr::autocorrelate;
use crate::window::SampleWindow;
use serde::{Deserialize, Serialize};

/// Tunables for [`PitchDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchParams {
    /// Windows with an RMS below this are too quiet to judge.
    pub silence_rms: f32,
    /// Minimum normalized autocorrelation peak.
    pub confidence_gate: f32,
    /// Lowest plausible frequency in Hz (exclusive).
    pub min_frequency: f32,
    /// Highest plausible frequency in Hz (exclusive).
    pub max_frequency: f32,
    /// Edge samples louder than this are trimmed away.
    pub trim_threshold: f32,
}

impl Default for PitchParams {
    fn default() -> Self {
        Self {
            silence_rms: 0.01,
            confidence_gate: 0.8,
            min_frequency: 50.0,
            max_frequency: 2000.0,
            trim_threshold: 0.2,
        }
    }
}

/// A reliable pitch found in one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchEstimate {
    /// Fundamental frequency in Hz.
    pub frequency: f32,
    /// Autocorrelation peak normalized by the zero-lag value, in [0, 1].
    pub confidence: f32,
}

/// Per-window fundamental frequency estimator.
///
/// Holds no state between calls; feeding the same window twice always
/// yields the same estimate.
#[derive(Debug, Clone, Default)]
pub struct PitchDetector {
    params: PitchParams,
}

impl PitchDetector {
    pub fn new(params: PitchParams) -> Self {
        PitchDetector { params }
    }

    pub fn params(&self) -> &PitchParams {
        &self.params
    }

    /// Estimates the pitch of a window.
    ///
    /// # Returns
    /// * `Some(estimate)` - A plausible pitch above the confidence gate
    /// * `None` - Silence, noise, or a frequency outside the plausible range
    pub fn detect(&self, window: &SampleWindow) -> Option<PitchEstimate> {
        // --- Noise gate ---
        if window.rms() < self.params.silence_rms {
            return None;
        }

        let trimmed = trim_edges(window.samples(), self.params.trim_threshold);
        if trimmed.len() < 3 {
            return None;
        }
        let c = autocorrelate(trimmed);
        let len = c.len();

        // --- Descend past the zero-lag peak ---
        let mut d = 0;
        while d + 1 < len && c[d] > c[d + 1] {
            d += 1;
        }

        // --- Global maximum after the first dip ---
        let mut max_val = f32::NEG_INFINITY;
        let mut max_pos = d;
        for (lag, &value) in c.iter().enumerate().skip(d) {
            if value > max_val {
                max_val = value;
                max_pos = lag;
            }
        }

        let period = refine_peak(&c, max_pos);
        if period <= 0.0 || c[0] <= 0.0 {
            return None;
        }

        let frequency = window.sample_rate() / period;
        let confidence = (max_val / c[0]).clamp(0.0, 1.0);

        let plausible = frequency.is_finite()
            && frequency > self.params.min_frequency
            && frequency < self.params.max_frequency;
        if plausible && confidence > self.params.confidence_gate {
            Some(PitchEstimate {
                frequency,
                confidence,
            })
        } else {
            log::trace!(
                "rejected pitch candidate {:.1} Hz (confidence {:.3})",
                frequency,
                confidence
            );
            None
        }
    }
}

/// Drops the leading and trailing samples up to the first quiet sample
/// found within each half of the buffer.
fn trim_edges(samples: &[f32], threshold: f32) -> &[f32] {
    let size = samples.len();
    let half = size / 2;

    let start = (0..half)
        .find(|&i| samples[i].abs() < threshold)
        .unwrap_or(0);
    let end = (1..half)
        .map(|i| size - i)
        .find(|&i| samples[i].abs() < threshold)
        .unwrap_or(size.saturating_sub(1));

    if start >= end {
        return &[];
    }
    &samples[start..end]
}

/// Parabolic interpolation of the peak at `pos` using its two neighbours.
///
/// Falls back to the integer lag at the buffer edges or when the three
/// points are collinear.
fn refine_peak(c: &[f32], pos: usize) -> f32 {
    if pos == 0 || pos + 1 >= c.len() {
        return pos as f32;
    }
    let x1 = c[pos - 1];
    let x2 = c[pos];
    let x3 = c[pos + 1];
    let a = (x1 + x3 - 2.0 * x2) / 2.0;
    let b = (x3 - x1) / 2.0;
    if a != 0.0 {
        pos as f32 - b / (2.0 * a)
    } else {
        pos as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::frequency_to_note_name;

    fn generate_sine(sample_rate: f32, frequency: f32, amplitude: f32, count: usize) -> Vec<f32> {
        (0..count)
            .map(|i| {
                amplitude * (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate).sin()
            })
            .collect()
    }

    #[test]
    fn test_sine_detection() {
        let detector = PitchDetector::default();
        for frequency in [220.0, 261.63, 440.0, 659.25, 880.0] {
            let samples = generate_sine(44100.0, frequency, 0.5, 2048);
            let window = SampleWindow::new(&samples, 44100.0);
            let estimate = detector.detect(&window).expect("pitch expected");
            assert!(
                (estimate.frequency - frequency).abs() < frequency * 0.01,
                "expected {frequency}, got {}",
                estimate.frequency
            );
            assert!(estimate.confidence > 0.8 && estimate.confidence <= 1.0);
        }
    }

    #[test]
    fn test_detected_note_name() {
        let samples = generate_sine(48000.0, 440.0, 0.3, 2048);
        let window = SampleWindow::new(&samples, 48000.0);
        let estimate = PitchDetector::default().detect(&window).unwrap();
        assert_eq!(
            frequency_to_note_name(estimate.frequency).unwrap().to_string(),
            "A4"
        );
    }

    #[test]
    fn test_silence_returns_none() {
        let detector = PitchDetector::default();
        let zeros = vec![0.0; 2048];
        assert!(detector.detect(&SampleWindow::new(&zeros, 44100.0)).is_none());

        // A clean tone that is simply too quiet (RMS ~0.0035).
        let quiet = generate_sine(44100.0, 440.0, 0.005, 2048);
        assert!(detector.detect(&SampleWindow::new(&quiet, 44100.0)).is_none());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let detector = PitchDetector::default();
        // 3 kHz is above the plausible range.
        let high = generate_sine(44100.0, 3000.0, 0.5, 2048);
        assert!(detector.detect(&SampleWindow::new(&high, 44100.0)).is_none());
    }

    #[test]
    fn test_gates_are_strict() {
        let samples = generate_sine(44100.0, 440.0, 0.5, 2048);
        let window = SampleWindow::new(&samples, 44100.0);
        let estimate = PitchDetector::default().detect(&window).unwrap();
        let with = |params: PitchParams| PitchDetector::new(params).detect(&window);

        // The estimate sitting exactly on either range edge is rejected.
        let at_min = with(PitchParams {
            min_frequency: estimate.frequency,
            ..PitchParams::default()
        });
        assert!(at_min.is_none());
        let at_max = with(PitchParams {
            max_frequency: estimate.frequency,
            ..PitchParams::default()
        });
        assert!(at_max.is_none());

        // Same for a confidence equal to the gate.
        let at_gate = with(PitchParams {
            confidence_gate: estimate.confidence,
            ..PitchParams::default()
        });
        assert!(at_gate.is_none());

        let just_inside = with(PitchParams {
            min_frequency: estimate.frequency - 0.01,
            max_frequency: estimate.frequency + 0.01,
            confidence_gate: estimate.confidence - 1e-4,
            ..PitchParams::default()
        });
        assert_eq!(just_inside, Some(estimate));
    }

    #[test]
    fn test_rms_equal_to_silence_gate_is_analysed() {
        let samples = generate_sine(44100.0, 440.0, 0.5, 2048);
        let window = SampleWindow::new(&samples, 44100.0);
        let detector = PitchDetector::new(PitchParams {
            silence_rms: window.rms(),
            ..PitchParams::default()
        });
        assert!(detector.detect(&window).is_some());
    }

    #[test]
    fn test_repeated_detection_is_identical() {
        let detector = PitchDetector::default();
        let samples = generate_sine(44100.0, 392.0, 0.4, 2048);
        let window = SampleWindow::new(&samples, 44100.0);
        assert_eq!(detector.detect(&window), detector.detect(&window));
    }

    #[test]
    fn test_refine_peak_guards() {
        // Collinear neighbours: no refinement.
        assert_eq!(refine_peak(&[1.0, 1.0, 1.0], 1), 1.0);
        // Edges: no refinement.
        assert_eq!(refine_peak(&[3.0, 2.0, 1.0], 0), 0.0);
        assert_eq!(refine_peak(&[1.0, 2.0, 3.0], 2), 2.0);
        // Symmetric peak stays put.
        assert!((refine_peak(&[1.0, 2.0, 1.0], 1) - 1.0).abs() < 1e-6);
        // Peak leaning right moves right.
        assert!(refine_peak(&[1.0, 2.0, 1.8], 1) > 1.0);
    }

    #[test]
    fn test_trim_edges() {
        let samples = [0.9, 0.8, 0.1, 0.5, 0.5, 0.1, 0.9, 0.9];
        assert_eq!(trim_edges(&samples, 0.2), &[0.1, 0.5, 0.5]);
    }
}
