//! # Note Segmentation Module
//!
//! Groups a time-stamped pitch stream into discrete note events.
//!
//! A segment is anchored at its first sample: later samples stay in the
//! segment only while they are within the frequency tolerance of that
//! first frequency, so slow drift cannot stretch one note into the next.

use crate::tuning::{NoteName, frequency_to_note_name};
use serde::{Deserialize, Serialize};

/// One pitch detector output, stamped with the window start time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchSample {
    /// Seconds from the start of the recording.
    pub time: f32,
    /// Detected frequency in Hz, `None` when the window had no reliable pitch.
    pub frequency: Option<f32>,
}

impl PitchSample {
    pub fn new(time: f32, frequency: Option<f32>) -> Self {
        PitchSample { time, frequency }
    }
}

/// A sung or played note recovered from the pitch stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub start_time: f32,
    pub duration: f32,
    /// Mean frequency of the samples making up the note.
    pub frequency: f32,
    pub note_name: Option<NoteName>,
}

/// Tunables for [`NoteSegmenter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterParams {
    /// Segments shorter than this (seconds) are dropped as transients.
    pub min_note_duration: f32,
    /// Maximum distance (Hz) from a segment's first frequency.
    pub frequency_tolerance_hz: f32,
}

impl Default for SegmenterParams {
    fn default() -> Self {
        Self {
            min_note_duration: 0.1,
            frequency_tolerance_hz: 25.0,
        }
    }
}

/// Splits pitch samples into [`NoteEvent`]s.
///
/// All scanning state lives inside [`segment`](Self::segment), so two
/// recordings analysed one after the other never share anything.
#[derive(Debug, Clone, Default)]
pub struct NoteSegmenter {
    params: SegmenterParams,
}

/// The run of samples currently being collected.
struct OpenSegment {
    start_time: f32,
    reference_frequency: f32,
    last_time: f32,
    frequency_sum: f32,
    count: usize,
}

impl OpenSegment {
    fn start(time: f32, frequency: f32) -> Self {
        OpenSegment {
            start_time: time,
            reference_frequency: frequency,
            last_time: time,
            frequency_sum: frequency,
            count: 1,
        }
    }

    fn push(&mut self, time: f32, frequency: f32) {
        self.last_time = time;
        self.frequency_sum += frequency;
        self.count += 1;
    }
}

impl NoteSegmenter {
    pub fn new(params: SegmenterParams) -> Self {
        NoteSegmenter { params }
    }

    pub fn params(&self) -> &SegmenterParams {
        &self.params
    }

    /// Scans `samples` left to right and emits every segment that lasts at
    /// least the minimum note duration.
    ///
    /// # Panics
    /// If `sample_rate` is not a finite, positive number.
    pub fn segment(&self, samples: &[PitchSample], sample_rate: f32) -> Vec<NoteEvent> {
        assert!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "sample rate must be finite and positive, got {sample_rate}"
        );

        let mut notes = Vec::new();
        let mut current: Option<OpenSegment> = None;

        for sample in samples {
            let Some(freq) = sample.frequency else {
                if let Some(segment) = current.take() {
                    self.finalize(segment, &mut notes);
                }
                continue;
            };

            match current.as_mut() {
                Some(segment)
                    if (freq - segment.reference_frequency).abs()
                        <= self.params.frequency_tolerance_hz =>
                {
                    segment.push(sample.time, freq);
                }
                _ => {
                    if let Some(done) = current.replace(OpenSegment::start(sample.time, freq)) {
                        self.finalize(done, &mut notes);
                    }
                }
            }
        }

        if let Some(segment) = current {
            self.finalize(segment, &mut notes);
        }
        notes
    }

    fn finalize(&self, segment: OpenSegment, notes: &mut Vec<NoteEvent>) {
        let duration = segment.last_time - segment.start_time;
        if duration < self.params.min_note_duration {
            log::trace!(
                "dropping {:.3}s segment at {:.3}s",
                duration,
                segment.start_time
            );
            return;
        }
        let frequency = segment.frequency_sum / segment.count as f32;
        notes.push(NoteEvent {
            start_time: segment.start_time,
            duration,
            frequency,
            note_name: frequency_to_note_name(frequency),
        });
    }
}
