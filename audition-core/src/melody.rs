//! # Melody Comparison Module
//!
//! Scores a sung melody against its target note by note. Notes are compared
//! positionally: the i-th target note against the i-th detected note, with no
//! realignment when the learner adds or skips a note.

use crate::segment::NoteEvent;
use crate::tuning::{NoteFrequencyTable, NoteName, cents_deviation};
use serde::{Deserialize, Serialize};

/// A note the learner is asked to sing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetNote {
    pub note: NoteName,
    /// Expected length in seconds.
    pub duration: f32,
}

impl TargetNote {
    pub fn new(note: NoteName, duration: f32) -> Self {
        TargetNote { note, duration }
    }
}

/// Relative weight of each sub-score in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyWeights {
    pub pitch: f32,
    pub duration: f32,
    pub sequence: f32,
}

impl Default for MelodyWeights {
    fn default() -> Self {
        Self {
            pitch: 0.5,
            duration: 0.3,
            sequence: 0.2,
        }
    }
}

impl MelodyWeights {
    pub fn sum(&self) -> f32 {
        self.pitch + self.duration + self.sequence
    }
}

/// Tunables for [`MelodyComparator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyParams {
    /// Maximum pitch deviation in cents still counted as in tune.
    pub pitch_tolerance_cents: f32,
    /// Maximum `|detected - target| / target` duration deviation.
    pub duration_tolerance_ratio: f32,
    pub weights: MelodyWeights,
}

impl Default for MelodyParams {
    fn default() -> Self {
        Self {
            pitch_tolerance_cents: 50.0,
            duration_tolerance_ratio: 0.35,
            weights: MelodyWeights::default(),
        }
    }
}

/// How one target note fared against the detected note at the same position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteComparison {
    pub target: NoteName,
    pub detected: NoteName,
    pub sequence_match: bool,
    pub pitch_match: bool,
    pub duration_match: bool,
    /// Pitch deviation from the target, when the target has a reference frequency.
    pub cents: Option<f32>,
}

/// Scores of one melody comparison, all in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodyComparison {
    pub overall_score: f32,
    pub pitch_score: f32,
    pub duration_score: f32,
    pub sequence_score: f32,
    pub details: Vec<NoteComparison>,
    pub feedback: String,
}

impl MelodyComparison {
    fn zero(feedback: &str) -> Self {
        MelodyComparison {
            overall_score: 0.0,
            pitch_score: 0.0,
            duration_score: 0.0,
            sequence_score: 0.0,
            details: Vec::new(),
            feedback: feedback.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MelodyComparator {
    params: MelodyParams,
}

impl Default for MelodyComparator {
    fn default() -> Self {
        MelodyComparator::new(MelodyParams::default())
    }
}

impl MelodyComparator {
    /// # Panics
    /// If the weights do not sum to 1 (within 1e-3).
    pub fn new(params: MelodyParams) -> Self {
        let sum = params.weights.sum();
        assert!(
            (sum - 1.0).abs() <= 1e-3,
            "melody weights must sum to 1.0, got {sum}"
        );
        MelodyComparator { params }
    }

    pub fn params(&self) -> &MelodyParams {
        &self.params
    }

    /// Compares `detected` against `target`.
    ///
    /// Detected notes without a name are ignored. An empty target or no
    /// usable detected note yields a zero score with an explanation.
    pub fn compare(
        &self,
        target: &[TargetNote],
        detected: &[NoteEvent],
        frequencies: &NoteFrequencyTable,
    ) -> MelodyComparison {
        if target.is_empty() {
            return MelodyComparison::zero("No target melody.");
        }
        let named: Vec<(&NoteEvent, NoteName)> = detected
            .iter()
            .filter_map(|event| event.note_name.map(|name| (event, name)))
            .collect();
        if named.is_empty() {
            return MelodyComparison::zero("No meaningful notes were detected.");
        }

        let details: Vec<NoteComparison> = target
            .iter()
            .zip(&named)
            .map(|(target_note, &(event, name))| {
                self.compare_note(target_note, event, name, frequencies)
            })
            .collect();
        let compared = details.len() as f32;

        let percent = |count: usize| count as f32 / compared * 100.0;
        let sequence_matches = details.iter().filter(|d| d.sequence_match).count();
        let sequence_score = percent(sequence_matches);
        let pitch_score = percent(details.iter().filter(|d| d.pitch_match).count());
        let duration_score = percent(details.iter().filter(|d| d.duration_match).count());

        let weights = &self.params.weights;
        let overall_score = pitch_score * weights.pitch
            + duration_score * weights.duration
            + sequence_score * weights.sequence;

        let mut feedback = format!(
            "Pitch: {:.0}%, Duration: {:.0}%, Sequence: {:.0}%. \
             {} of {} notes in the correct order.",
            pitch_score,
            duration_score,
            sequence_score,
            sequence_matches,
            details.len()
        );
        if target.len() != named.len() {
            feedback.push_str(&format!(
                " (Detected: {}, Target: {} notes)",
                named.len(),
                target.len()
            ));
        }

        log::debug!(
            "melody compared over {} notes: overall {:.1}",
            details.len(),
            overall_score
        );

        MelodyComparison {
            overall_score,
            pitch_score,
            duration_score,
            sequence_score,
            details,
            feedback,
        }
    }

    fn compare_note(
        &self,
        target: &TargetNote,
        event: &NoteEvent,
        name: NoteName,
        frequencies: &NoteFrequencyTable,
    ) -> NoteComparison {
        let cents = frequencies
            .frequency(&target.note)
            .filter(|_| event.frequency > 0.0)
            .map(|target_freq| cents_deviation(event.frequency, target_freq));
        let pitch_match = cents.is_some_and(|c| c.abs() <= self.params.pitch_tolerance_cents);

        let duration_match = target.duration > 0.0
            && (event.duration - target.duration).abs() / target.duration
                <= self.params.duration_tolerance_ratio;

        NoteComparison {
            target: target.note,
            detected: name,
            sequence_match: target.note == name,
            pitch_match,
            duration_match,
            cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::frequency_to_note_name;

    fn target(notes: &[(&str, f32)]) -> Vec<TargetNote> {
        notes
            .iter()
            .map(|&(n, d)| TargetNote::new(n.parse().unwrap(), d))
            .collect()
    }

    fn event(start: f32, duration: f32, frequency: f32) -> NoteEvent {
        NoteEvent {
            start_time: start,
            duration,
            frequency,
            note_name: frequency_to_note_name(frequency),
        }
    }

    fn c_e_g() -> Vec<TargetNote> {
        target(&[("C4", 0.5), ("E4", 0.5), ("G4", 0.5)])
    }

    #[test]
    fn test_perfect_performance() {
        let detected = vec![
            event(0.0, 0.5, 261.63),
            event(0.6, 0.48, 330.5),
            event(1.2, 0.55, 391.0),
        ];
        let result = MelodyComparator::default().compare(
            &c_e_g(),
            &detected,
            NoteFrequencyTable::standard(),
        );
        assert!((result.overall_score - 100.0).abs() < 1e-3);
        assert_eq!(result.pitch_score, 100.0);
        assert_eq!(result.duration_score, 100.0);
        assert_eq!(result.sequence_score, 100.0);
        assert_eq!(result.details.len(), 3);
        assert!(!result.feedback.contains("Detected:"));
    }

    #[test]
    fn test_no_detected_notes() {
        let result =
            MelodyComparator::default().compare(&c_e_g(), &[], NoteFrequencyTable::standard());
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.pitch_score, 0.0);
        assert_eq!(result.duration_score, 0.0);
        assert_eq!(result.sequence_score, 0.0);
        assert!(result.details.is_empty());
        assert!(!result.feedback.is_empty());
    }

    #[test]
    fn test_unnamed_notes_are_ignored() {
        let unnamed = NoteEvent {
            start_time: 0.0,
            duration: 0.5,
            frequency: 15_000.0,
            note_name: None,
        };
        let result = MelodyComparator::default().compare(
            &c_e_g(),
            &[unnamed],
            NoteFrequencyTable::standard(),
        );
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn test_empty_target() {
        let result = MelodyComparator::default().compare(
            &[],
            &[event(0.0, 0.5, 261.63)],
            NoteFrequencyTable::standard(),
        );
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn test_partial_scores_and_length_mismatch() {
        // Right pitch but too short, then a wrong note, and one note missing.
        let detected = vec![event(0.0, 0.2, 261.63), event(0.3, 0.5, 349.23)];
        let result = MelodyComparator::default().compare(
            &c_e_g(),
            &detected,
            NoteFrequencyTable::standard(),
        );
        assert_eq!(result.details.len(), 2);
        assert_eq!(result.sequence_score, 50.0);
        assert_eq!(result.pitch_score, 50.0);
        assert_eq!(result.duration_score, 50.0);
        assert!((result.overall_score - 50.0).abs() < 1e-3);
        assert!(result.feedback.contains("(Detected: 2, Target: 3 notes)"));

        let second = &result.details[1];
        assert_eq!(second.detected.to_string(), "F4");
        assert!(!second.sequence_match);
        assert!(!second.pitch_match);
        // F4 is a semitone above E4.
        assert!((second.cents.unwrap() - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_pitch_tolerance_boundary() {
        let a4 = target(&[("A4", 1.0)]);
        // 40 cents sharp: still the same note name, within 50 cents.
        let sharp = 440.0 * 2.0_f32.powf(40.0 / 1200.0);
        let result = MelodyComparator::default().compare(
            &a4,
            &[event(0.0, 1.0, sharp)],
            NoteFrequencyTable::standard(),
        );
        assert_eq!(result.pitch_score, 100.0);

        let strict = MelodyComparator::new(MelodyParams {
            pitch_tolerance_cents: 30.0,
            ..MelodyParams::default()
        });
        let result = strict.compare(
            &a4,
            &[event(0.0, 1.0, sharp)],
            NoteFrequencyTable::standard(),
        );
        assert_eq!(result.pitch_score, 0.0);
        assert_eq!(result.sequence_score, 100.0);
    }

    #[test]
    fn test_duration_ratio_boundary_is_inclusive() {
        let a4 = target(&[("A4", 3.0)]);
        let table = NoteFrequencyTable::standard();
        let comparator = MelodyComparator::default();

        // |1.95 - 3.0| / 3.0 is exactly the 0.35 tolerance in f32.
        let on_edge = comparator.compare(&a4, &[event(0.0, 1.95, 440.0)], table);
        assert!(on_edge.details[0].duration_match);
        assert_eq!(on_edge.duration_score, 100.0);

        // |4.05 - 3.0| / 3.0 rounds just above it.
        let over = comparator.compare(&a4, &[event(0.0, 4.05, 440.0)], table);
        assert!(!over.details[0].duration_match);
    }

    #[test]
    fn test_note_missing_from_table_never_matches_pitch() {
        let table = NoteFrequencyTable::from_entries([("C4".parse().unwrap(), 261.63)]);
        let result = MelodyComparator::default().compare(
            &target(&[("A4", 1.0)]),
            &[event(0.0, 1.0, 440.0)],
            &table,
        );
        assert_eq!(result.pitch_score, 0.0);
        assert_eq!(result.details[0].cents, None);
    }

    #[test]
    #[should_panic]
    fn test_weights_must_sum_to_one() {
        MelodyComparator::new(MelodyParams {
            weights: MelodyWeights {
                pitch: 0.5,
                duration: 0.5,
                sequence: 0.5,
            },
            ..MelodyParams::default()
        });
    }
}
