//! Fixed-size blocks of mono samples handed to the detectors.

/// Default number of samples per analysis window (~46ms at 44.1 kHz).
pub const DEFAULT_WINDOW_SIZE: usize = 2048;

/// A borrowed window of mono samples (range roughly [-1, 1]) together with
/// the sample rate of the source it was captured from.
#[derive(Debug, Clone, Copy)]
pub struct SampleWindow<'a> {
    samples: &'a [f32],
    sample_rate: f32,
}

impl<'a> SampleWindow<'a> {
    /// # Panics
    /// If `sample_rate` is not a finite, positive number.
    pub fn new(samples: &'a [f32], sample_rate: f32) -> Self {
        assert!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "sample rate must be finite and positive, got {sample_rate}"
        );
        SampleWindow {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Root mean square amplitude. Zero for an empty window.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        (self.samples.iter().map(|&s| s * s).sum::<f32>() / self.samples.len() as f32).sqrt()
    }

    /// Peak absolute amplitude.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0, |peak, &s| peak.max(s.abs()))
    }
}
