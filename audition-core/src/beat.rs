//! # Beat Detection Module
//!
//! Energy based onset detection for tapped or clapped rhythms, plus the
//! input level meter shown while listening.

use crate::window::SampleWindow;
use serde::{Deserialize, Serialize};

/// Tunables for [`BeatDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatParams {
    /// Window RMS that must be exceeded for an onset.
    pub rms_threshold: f32,
    /// Minimum gap between two beats in milliseconds.
    pub refractory_ms: f64,
    /// Gain applied to the peak amplitude by [`BeatDetector::audio_level`].
    pub level_gain: f32,
}

impl Default for BeatParams {
    fn default() -> Self {
        Self {
            rms_threshold: 0.15,
            refractory_ms: 150.0,
            level_gain: 200.0,
        }
    }
}

/// Per-stream onset detector.
///
/// The time of the last fired beat is the only state kept between calls.
/// Each simultaneous stream needs its own instance, and [`reset`](Self::reset)
/// must be called when a new listening session starts.
#[derive(Debug, Clone, Default)]
pub struct BeatDetector {
    params: BeatParams,
    last_beat_ms: Option<f64>,
}

impl BeatDetector {
    pub fn new(params: BeatParams) -> Self {
        BeatDetector {
            params,
            last_beat_ms: None,
        }
    }

    /// Returns true when the window is loud enough and the refractory
    /// interval since the previous beat has elapsed.
    ///
    /// # Arguments
    /// * `window` - The samples to inspect
    /// * `now_ms` - Capture time of the window in milliseconds
    pub fn detect_beat(&mut self, window: &SampleWindow, now_ms: f64) -> bool {
        if window.rms() <= self.params.rms_threshold {
            return false;
        }
        let rested = self
            .last_beat_ms
            .is_none_or(|last| now_ms - last >= self.params.refractory_ms);
        if !rested {
            return false;
        }
        log::trace!("beat at {:.1} ms", now_ms);
        self.last_beat_ms = Some(now_ms);
        true
    }

    /// Peak amplitude scaled for metering, clamped to [0, 100].
    pub fn audio_level(&self, window: &SampleWindow) -> f32 {
        (window.peak() * self.params.level_gain).clamp(0.0, 100.0)
    }

    /// Forgets the last beat so the next loud window fires immediately.
    pub fn reset(&mut self) {
        self.last_beat_ms = None;
    }

    pub fn last_beat_ms(&self) -> Option<f64> {
        self.last_beat_ms
    }
}
