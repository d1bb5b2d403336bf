//! Walks a decoded recording window by window and collects detector output.

use crate::beat::BeatDetector;
use crate::pitch::PitchDetector;
use crate::segment::PitchSample;
use crate::window::{DEFAULT_WINDOW_SIZE, SampleWindow};
use serde::{Deserialize, Serialize};

/// Window and hop sizes used when scanning a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    pub window_size: usize,
    pub hop_size: usize,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            hop_size: DEFAULT_WINDOW_SIZE / 4,
        }
    }
}

/// Runs detectors over overlapping windows of a materialized buffer.
#[derive(Debug, Clone, Default)]
pub struct PitchTracker {
    params: TrackerParams,
}

impl PitchTracker {
    /// # Panics
    /// If the window or hop size is zero.
    pub fn new(params: TrackerParams) -> Self {
        assert!(params.window_size > 0, "window size must be positive");
        assert!(params.hop_size > 0, "hop size must be positive");
        PitchTracker { params }
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    /// Yields `(start_index, window)` for every full window in `samples`.
    fn windows<'a>(
        &self,
        samples: &'a [f32],
        sample_rate: f32,
    ) -> impl Iterator<Item = (usize, SampleWindow<'a>)> + 'a {
        let window_size = self.params.window_size;
        let last_start = samples.len().checked_sub(window_size);
        (0..)
            .step_by(self.params.hop_size)
            .take_while(move |&start| last_start.is_some_and(|last| start <= last))
            .map(move |start| {
                (
                    start,
                    SampleWindow::new(&samples[start..start + window_size], sample_rate),
                )
            })
    }

    /// One [`PitchSample`] per full window, stamped with the window start.
    pub fn track(
        &self,
        detector: &PitchDetector,
        samples: &[f32],
        sample_rate: f32,
    ) -> Vec<PitchSample> {
        let pitches: Vec<PitchSample> = self
            .windows(samples, sample_rate)
            .map(|(start, window)| {
                PitchSample::new(
                    start as f32 / sample_rate,
                    detector.detect(&window).map(|estimate| estimate.frequency),
                )
            })
            .collect();
        log::debug!(
            "tracked {} windows, {} voiced",
            pitches.len(),
            pitches.iter().filter(|p| p.frequency.is_some()).count()
        );
        pitches
    }

    /// Beat timestamps (milliseconds from the start of the buffer) found by
    /// running `detector` over every window. The detector is reset first.
    pub fn beat_times(
        &self,
        detector: &mut BeatDetector,
        samples: &[f32],
        sample_rate: f32,
    ) -> Vec<f64> {
        detector.reset();
        self.windows(samples, sample_rate)
            .filter_map(|(start, window)| {
                let now_ms = start as f64 * 1000.0 / sample_rate as f64;
                detector.detect_beat(&window, now_ms).then_some(now_ms)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(sample_rate: f32, frequency: f32, seconds: f32) -> Vec<f32> {
        let count = (sample_rate * seconds) as usize;
        (0..count)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_window_count_and_times() {
        let tracker = PitchTracker::new(TrackerParams {
            window_size: 1000,
            hop_size: 250,
        });
        let samples = vec![0.0; 2000];
        let pitches = tracker.track(&PitchDetector::default(), &samples, 1000.0);
        // Starts at 0, 250, ..., 1000.
        assert_eq!(pitches.len(), 5);
        assert_eq!(pitches[1].time, 0.25);
        assert!(pitches.iter().all(|p| p.frequency.is_none()));
    }

    #[test]
    fn test_short_buffer_yields_nothing() {
        let tracker = PitchTracker::default();
        let samples = vec![0.1; 100];
        assert!(tracker.track(&PitchDetector::default(), &samples, 44100.0).is_empty());
    }

    #[test]
    fn test_tracks_steady_tone() {
        let samples = tone(44100.0, 440.0, 0.5);
        let pitches = PitchTracker::default().track(&PitchDetector::default(), &samples, 44100.0);
        assert!(!pitches.is_empty());
        for pitch in &pitches {
            let frequency = pitch.frequency.expect("voiced window");
            assert!((frequency - 440.0).abs() < 4.4);
        }
    }

    #[test]
    fn test_beat_times_from_clicks() {
        let sample_rate = 10_000.0;
        let mut samples = vec![0.0; 10_000];
        // Two 20ms bursts at 100ms and 600ms.
        for start in [1000, 6000] {
            for s in &mut samples[start..start + 200] {
                *s = 0.8;
            }
        }
        let tracker = PitchTracker::new(TrackerParams {
            window_size: 100,
            hop_size: 100,
        });
        let beats = tracker.beat_times(&mut BeatDetector::default(), &samples, sample_rate);
        assert_eq!(beats, vec![100.0, 600.0]);
    }

    #[test]
    #[should_panic]
    fn test_zero_hop_panics() {
        PitchTracker::new(TrackerParams {
            window_size: 1024,
            hop_size: 0,
        });
    }
}
