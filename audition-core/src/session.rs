//! # Listening Session Module
//!
//! Per-window analysis of a live input stream. A session owns one pitch
//! detector, one beat detector and the stable-note capture state, and is
//! driven by the capture layer one window at a time.
//!
//! ## Capture rule
//! A note is appended to the captured sequence when its pitch confidence
//! exceeds the capture threshold and it differs from the last captured note.
//! A window without pitch clears the last captured note, so repeating the
//! same note after a pause captures it again.

use crate::beat::{BeatDetector, BeatParams};
use crate::pitch::{PitchDetector, PitchEstimate, PitchParams};
use crate::tuning::{NoteName, cents_deviation, find_nearest_note};
use crate::window::SampleWindow;
use serde::{Deserialize, Serialize};

/// Tunables for the stable-note capture rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureParams {
    /// Pitch confidence required before a note is captured.
    pub confidence: f32,
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self { confidence: 0.9 }
    }
}

/// Result of a single live window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub pitch: Option<PitchEstimate>,
    /// Nearest note to the detected pitch.
    pub note: Option<NoteName>,
    /// Deviation from the nearest note in cents.
    pub cents_deviation: Option<f32>,
    pub beat: bool,
    /// Input meter value in [0, 100].
    pub level: f32,
}

/// A live listening session over one input stream.
#[derive(Debug, Clone, Default)]
pub struct ListeningSession {
    pitch_detector: PitchDetector,
    beat_detector: BeatDetector,
    capture: CaptureParams,
    captured_notes: Vec<NoteName>,
    last_captured: Option<NoteName>,
    beat_times_ms: Vec<f64>,
}

impl ListeningSession {
    pub fn new(pitch: PitchParams, beat: BeatParams, capture: CaptureParams) -> Self {
        ListeningSession {
            pitch_detector: PitchDetector::new(pitch),
            beat_detector: BeatDetector::new(beat),
            capture,
            ..Default::default()
        }
    }

    /// Analyses one window captured at `now_ms`.
    pub fn process(&mut self, window: &SampleWindow, now_ms: f64) -> FrameAnalysis {
        let pitch = self.pitch_detector.detect(window);

        let nearest = pitch.and_then(|estimate| {
            find_nearest_note(estimate.frequency)
                .map(|(note, target)| (note, cents_deviation(estimate.frequency, target)))
        });

        match (pitch, nearest) {
            (Some(estimate), Some((note, _))) => {
                if estimate.confidence > self.capture.confidence
                    && self.last_captured != Some(note)
                {
                    log::debug!("captured {} at {:.0} ms", note, now_ms);
                    self.captured_notes.push(note);
                    self.last_captured = Some(note);
                }
            }
            _ => self.last_captured = None,
        }

        let beat = self.beat_detector.detect_beat(window, now_ms);
        if beat {
            self.beat_times_ms.push(now_ms);
        }

        FrameAnalysis {
            pitch,
            note: nearest.map(|(note, _)| note),
            cents_deviation: nearest.map(|(_, cents)| cents),
            beat,
            level: self.beat_detector.audio_level(window),
        }
    }

    /// Notes captured so far, in the order they were sung.
    pub fn captured_notes(&self) -> &[NoteName] {
        &self.captured_notes
    }

    /// Timestamps (ms) of every fired beat.
    pub fn beat_times(&self) -> &[f64] {
        &self.beat_times_ms
    }

    /// Starts a new round: clears captured notes, beats and the refractory clock.
    pub fn reset(&mut self) {
        self.captured_notes.clear();
        self.beat_times_ms.clear();
        self.last_captured = None;
        self.beat_detector.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, amplitude: f32) -> Vec<f32> {
        (0..2048)
            .map(|i| {
                amplitude * (2.0 * std::f32::consts::PI * frequency * i as f32 / 44100.0).sin()
            })
            .collect()
    }

    #[test]
    fn test_captures_distinct_stable_notes() {
        let mut session = ListeningSession::default();
        let a4 = sine(440.0, 0.3);
        let c5 = sine(523.25, 0.3);
        let silence = vec![0.0; 2048];

        let frame = session.process(&SampleWindow::new(&a4, 44100.0), 0.0);
        assert_eq!(frame.note.unwrap().to_string(), "A4");
        assert!(frame.cents_deviation.unwrap().abs() < 10.0);

        session.process(&SampleWindow::new(&a4, 44100.0), 50.0);
        session.process(&SampleWindow::new(&c5, 44100.0), 100.0);
        session.process(&SampleWindow::new(&silence, 44100.0), 150.0);
        session.process(&SampleWindow::new(&c5, 44100.0), 200.0);

        let captured: Vec<String> = session
            .captured_notes()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(captured, ["A4", "C5", "C5"]);
    }

    #[test]
    fn test_beats_and_reset() {
        let mut session = ListeningSession::default();
        let loud = vec![0.6; 2048];
        let frame = session.process(&SampleWindow::new(&loud, 44100.0), 0.0);
        assert!(frame.beat);
        assert_eq!(frame.level, 100.0);
        assert!(!session.process(&SampleWindow::new(&loud, 44100.0), 100.0).beat);
        assert!(session.process(&SampleWindow::new(&loud, 44100.0), 300.0).beat);
        assert_eq!(session.beat_times(), &[0.0, 300.0]);

        session.reset();
        assert!(session.beat_times().is_empty());
        assert!(session.captured_notes().is_empty());
        assert!(session.process(&SampleWindow::new(&loud, 44100.0), 310.0).beat);
    }
}
