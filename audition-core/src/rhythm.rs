//! # Rhythm Comparison Module
//!
//! Scores tapped beats against a target rhythm by comparing consecutive
//! inter-tap intervals. All times are in milliseconds.

use serde::{Deserialize, Serialize};

/// Tunables for [`RhythmComparator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmParams {
    /// Largest accepted interval error in milliseconds.
    pub abs_tolerance_ms: f64,
    /// Largest accepted interval error as a fraction of the target interval.
    pub rel_tolerance: f64,
    /// Target intervals at or below this (ms) only use the absolute tolerance.
    pub degenerate_interval_ms: f64,
}

impl Default for RhythmParams {
    fn default() -> Self {
        Self {
            abs_tolerance_ms: 150.0,
            rel_tolerance: 0.25,
            degenerate_interval_ms: 10.0,
        }
    }
}

/// Beat times of a target rhythm, in seconds from the first beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RhythmTargetDef")]
pub struct RhythmTarget {
    times: Vec<f64>,
}

#[derive(Deserialize)]
struct RhythmTargetDef {
    times: Vec<f64>,
}

/// Why a list of beat times is not a valid rhythm.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RhythmTargetError {
    #[error("a rhythm needs at least one beat")]
    Empty,
    #[error("the first beat must be at 0s, got {0}s")]
    FirstBeatNotZero(f64),
    #[error("beat {index} at {time}s does not come after the previous beat")]
    NotIncreasing { index: usize, time: f64 },
}

impl TryFrom<RhythmTargetDef> for RhythmTarget {
    type Error = RhythmTargetError;

    fn try_from(def: RhythmTargetDef) -> Result<Self, Self::Error> {
        RhythmTarget::new(def.times)
    }
}

impl RhythmTarget {
    pub fn new(times: Vec<f64>) -> Result<Self, RhythmTargetError> {
        let first = *times.first().ok_or(RhythmTargetError::Empty)?;
        if first != 0.0 {
            return Err(RhythmTargetError::FirstBeatNotZero(first));
        }
        if let Some(index) = times.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(RhythmTargetError::NotIncreasing {
                index: index + 1,
                time: times[index + 1],
            });
        }
        Ok(RhythmTarget { times })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn beat_count(&self) -> usize {
        self.times.len()
    }

    /// Gaps between consecutive beats in milliseconds.
    pub fn intervals_ms(&self) -> Vec<f64> {
        self.times
            .windows(2)
            .map(|w| (w[1] - w[0]) * 1000.0)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmComparison {
    /// Percentage of intervals reproduced within tolerance.
    pub score: f64,
    /// One flag per target interval.
    pub interval_results: Vec<bool>,
    pub feedback: String,
}

#[derive(Debug, Clone, Default)]
pub struct RhythmComparator {
    params: RhythmParams,
}

impl RhythmComparator {
    pub fn new(params: RhythmParams) -> Self {
        RhythmComparator { params }
    }

    pub fn params(&self) -> &RhythmParams {
        &self.params
    }

    /// Compares tap timestamps against the target intervals.
    ///
    /// A tap count different from `target_beat_count` always scores zero.
    ///
    /// # Panics
    /// If `target_intervals` does not hold exactly `target_beat_count - 1`
    /// entries.
    pub fn compare(
        &self,
        taps_ms: &[f64],
        target_intervals_ms: &[f64],
        target_beat_count: usize,
    ) -> RhythmComparison {
        assert_eq!(
            target_intervals_ms.len() + 1,
            target_beat_count,
            "a rhythm of {target_beat_count} beats has {} intervals",
            target_beat_count.saturating_sub(1)
        );

        if taps_ms.len() < 2 {
            return RhythmComparison {
                score: 0.0,
                interval_results: Vec::new(),
                feedback: "Not enough taps.".to_string(),
            };
        }

        if taps_ms.len() != target_beat_count {
            return RhythmComparison {
                score: 0.0,
                interval_results: vec![false; target_intervals_ms.len()],
                feedback: format!(
                    "Wrong number of beats! Target {}, you tapped {}.",
                    target_beat_count,
                    taps_ms.len()
                ),
            };
        }

        let interval_results: Vec<bool> = taps_ms
            .windows(2)
            .zip(target_intervals_ms)
            .map(|(pair, &target)| self.interval_correct(pair[1] - pair[0], target))
            .collect();

        let correct = interval_results.iter().filter(|&&ok| ok).count();
        let score = correct as f64 / target_intervals_ms.len() as f64 * 100.0;

        log::debug!(
            "rhythm: {}/{} intervals correct",
            correct,
            target_intervals_ms.len()
        );

        RhythmComparison {
            score,
            feedback: format!(
                "{} of {} intervals correct.",
                correct,
                target_intervals_ms.len()
            ),
            interval_results,
        }
    }

    /// Convenience wrapper deriving intervals and beat count from `target`.
    pub fn compare_target(&self, taps_ms: &[f64], target: &RhythmTarget) -> RhythmComparison {
        self.compare(taps_ms, &target.intervals_ms(), target.beat_count())
    }

    /// Both tolerances must hold, except for near-zero target intervals
    /// where only the absolute one applies.
    fn interval_correct(&self, observed: f64, target: f64) -> bool {
        let diff = (observed - target).abs();
        if target > self.params.degenerate_interval_ms {
            diff <= self.params.abs_tolerance_ms && diff <= target * self.params.rel_tolerance
        } else {
            diff <= self.params.abs_tolerance_ms
        }
    }
}
