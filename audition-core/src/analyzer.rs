//! Whole-recording pipelines: decoded buffer in, score out.
//!
//! Each call builds its pitch stream and note list from scratch, so
//! consecutive rounds never see leftover segmentation state.

use crate::beat::BeatDetector;
use crate::chord::{ChordComparator, ChordComparison};
use crate::config::{AnalysisConfig, ConfigError};
use crate::melody::{MelodyComparator, MelodyComparison, TargetNote};
use crate::pitch::PitchDetector;
use crate::rhythm::{RhythmComparator, RhythmComparison, RhythmTarget};
use crate::segment::{NoteEvent, NoteSegmenter};
use crate::single::{SingleNoteComparison, compare_single_note};
use crate::tracker::PitchTracker;
use crate::tuning::{NoteFrequencyTable, NoteName};

/// The configured set of detectors and comparators.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    pitch: PitchDetector,
    tracker: PitchTracker,
    segmenter: NoteSegmenter,
    melody: MelodyComparator,
    chord: ChordComparator,
    rhythm: RhythmComparator,
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::build(AnalysisConfig::default())
    }
}

impl Analyzer {
    /// Validates `config` and builds every component from it.
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Analyzer::build(config))
    }

    fn build(config: AnalysisConfig) -> Self {
        Analyzer {
            pitch: PitchDetector::new(config.pitch.clone()),
            tracker: PitchTracker::new(config.tracker.clone()),
            segmenter: NoteSegmenter::new(config.segmenter.clone()),
            melody: MelodyComparator::new(config.melody.clone()),
            chord: ChordComparator::new(config.chord.clone()),
            rhythm: RhythmComparator::new(config.rhythm.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Pitch tracking followed by segmentation.
    pub fn detect_notes(&self, samples: &[f32], sample_rate: f32) -> Vec<NoteEvent> {
        let pitches = self.tracker.track(&self.pitch, samples, sample_rate);
        let notes = self.segmenter.segment(&pitches, sample_rate);
        log::debug!("segmented {} notes", notes.len());
        notes
    }

    pub fn analyze_note(
        &self,
        samples: &[f32],
        sample_rate: f32,
        target: &NoteName,
    ) -> SingleNoteComparison {
        compare_single_note(target, &self.detect_notes(samples, sample_rate))
    }

    /// Uses the target's own length as the required note count.
    pub fn analyze_chord(
        &self,
        samples: &[f32],
        sample_rate: f32,
        target: &[NoteName],
    ) -> ChordComparison {
        let detected = self.detect_notes(samples, sample_rate);
        self.chord.compare(target, &detected, target.len())
    }

    pub fn analyze_melody(
        &self,
        samples: &[f32],
        sample_rate: f32,
        target: &[TargetNote],
        frequencies: &NoteFrequencyTable,
    ) -> MelodyComparison {
        let detected = self.detect_notes(samples, sample_rate);
        self.melody.compare(target, &detected, frequencies)
    }

    /// Detects taps as beats in the recording and compares them to `target`.
    pub fn analyze_rhythm(
        &self,
        samples: &[f32],
        sample_rate: f32,
        target: &RhythmTarget,
    ) -> RhythmComparison {
        let mut detector = BeatDetector::new(self.config.beat.clone());
        let taps = self.tracker.beat_times(&mut detector, samples, sample_rate);
        log::debug!("detected {} taps", taps.len());
        self.rhythm.compare_target(&taps, target)
    }
}
