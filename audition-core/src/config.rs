//! Aggregated analysis configuration.
//!
//! Every section defaults to the reference values, so a config file only
//! needs the keys it wants to change:
//!
//! ```toml
//! [melody]
//! pitch_tolerance_cents = 35.0
//!
//! [rhythm]
//! abs_tolerance_ms = 120.0
//! ```

use crate::beat::BeatParams;
use crate::chord::ChordParams;
use crate::melody::MelodyParams;
use crate::pitch::PitchParams;
use crate::rhythm::RhythmParams;
use crate::segment::SegmenterParams;
use crate::session::CaptureParams;
use crate::tracker::TrackerParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub pitch: PitchParams,
    pub beat: BeatParams,
    pub tracker: TrackerParams,
    pub segmenter: SegmenterParams,
    pub melody: MelodyParams,
    pub chord: ChordParams,
    pub rhythm: RhythmParams,
    pub capture: CaptureParams,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("pitch range is empty: {min} Hz .. {max} Hz")]
    EmptyPitchRange { min: f32, max: f32 },
    #[error("hop size {hop} is larger than the window size {window}")]
    HopLargerThanWindow { hop: usize, window: usize },
    #[error("melody weights must be non-negative and sum to 1.0, got {sum}")]
    BadMelodyWeights { sum: f32 },
}

fn unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

impl AnalysisConfig {
    /// Checks every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pitch = &self.pitch;
        positive("pitch.silence_rms", pitch.silence_rms as f64)?;
        unit("pitch.confidence_gate", pitch.confidence_gate as f64)?;
        unit("pitch.trim_threshold", pitch.trim_threshold as f64)?;
        positive("pitch.min_frequency", pitch.min_frequency as f64)?;
        if pitch.min_frequency >= pitch.max_frequency {
            return Err(ConfigError::EmptyPitchRange {
                min: pitch.min_frequency,
                max: pitch.max_frequency,
            });
        }

        positive("beat.rms_threshold", self.beat.rms_threshold as f64)?;
        positive("beat.refractory_ms", self.beat.refractory_ms)?;
        positive("beat.level_gain", self.beat.level_gain as f64)?;

        positive("tracker.window_size", self.tracker.window_size as f64)?;
        positive("tracker.hop_size", self.tracker.hop_size as f64)?;
        if self.tracker.hop_size > self.tracker.window_size {
            return Err(ConfigError::HopLargerThanWindow {
                hop: self.tracker.hop_size,
                window: self.tracker.window_size,
            });
        }

        positive("segmenter.min_note_duration", self.segmenter.min_note_duration as f64)?;
        positive(
            "segmenter.frequency_tolerance_hz",
            self.segmenter.frequency_tolerance_hz as f64,
        )?;

        positive("melody.pitch_tolerance_cents", self.melody.pitch_tolerance_cents as f64)?;
        positive(
            "melody.duration_tolerance_ratio",
            self.melody.duration_tolerance_ratio as f64,
        )?;
        let weights = &self.melody.weights;
        let sum = weights.sum();
        let non_negative =
            weights.pitch >= 0.0 && weights.duration >= 0.0 && weights.sequence >= 0.0;
        if !non_negative || (sum - 1.0).abs() > 1e-3 {
            return Err(ConfigError::BadMelodyWeights { sum });
        }

        positive("chord.triad_partial_credit", self.chord.triad_partial_credit as f64)?;

        positive("rhythm.abs_tolerance_ms", self.rhythm.abs_tolerance_ms)?;
        positive("rhythm.rel_tolerance", self.rhythm.rel_tolerance)?;
        unit("capture.confidence", self.capture.confidence as f64)?;
        Ok(())
    }
}
