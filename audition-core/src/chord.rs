//! # Chord Comparison Module
//!
//! Checks a sung dyad or triad (the chord notes sung one after another)
//! against its target. Order does not matter; the notes are compared as sets.

use crate::segment::NoteEvent;
use crate::tuning::NoteName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tunables for [`ChordComparator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordParams {
    /// Distinct target notes that must be present for a triad to pass
    /// without being a perfect match.
    pub triad_partial_credit: usize,
}

impl Default for ChordParams {
    fn default() -> Self {
        Self {
            triad_partial_credit: 2,
        }
    }
}

/// How a chord attempt was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChordVerdict {
    /// Fewer named notes than the chord requires.
    TooFewNotes { found: usize },
    Perfect,
    /// Triad only: enough target notes present to pass.
    Partial { matched: usize },
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordComparison {
    #[serde(rename = "match")]
    pub matched: bool,
    pub verdict: ChordVerdict,
    /// The detected notes that were judged, in the order they were sung.
    pub judged: Vec<NoteName>,
    pub feedback: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChordComparator {
    params: ChordParams,
}

fn join(notes: &[NoteName]) -> String {
    notes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("-")
}

impl ChordComparator {
    pub fn new(params: ChordParams) -> Self {
        ChordComparator { params }
    }

    /// Compares the first `required_count` named notes of `detected` with
    /// `target`.
    ///
    /// # Panics
    /// If `target` is empty or `required_count` is zero.
    pub fn compare(
        &self,
        target: &[NoteName],
        detected: &[NoteEvent],
        required_count: usize,
    ) -> ChordComparison {
        assert!(!target.is_empty(), "chord target must not be empty");
        assert!(required_count > 0, "required note count must be positive");

        let named: Vec<NoteName> = detected.iter().filter_map(|n| n.note_name).collect();
        if named.len() < required_count {
            return ChordComparison {
                matched: false,
                verdict: ChordVerdict::TooFewNotes { found: named.len() },
                judged: named.clone(),
                feedback: format!(
                    "Not enough notes detected ({}/{}).",
                    named.len(),
                    required_count
                ),
            };
        }

        let judged = named[..required_count].to_vec();
        let target_set: BTreeSet<NoteName> = target.iter().copied().collect();
        let judged_set: BTreeSet<NoteName> = judged.iter().copied().collect();

        let perfect = target.len() == judged.len() && target_set == judged_set;
        let present = target_set.intersection(&judged_set).count();
        let partial = required_count == 3 && present >= self.params.triad_partial_credit;

        let (verdict, mut feedback) = if perfect {
            (
                ChordVerdict::Perfect,
                format!(
                    "Perfect! The target notes ({}) match the detected notes ({}).",
                    join(target),
                    join(&judged)
                ),
            )
        } else if partial {
            (
                ChordVerdict::Partial { matched: present },
                format!(
                    "Good! Enough of the target notes ({}) were found \
                     in the detected notes ({}): {}/3.",
                    join(target),
                    join(&judged),
                    present
                ),
            )
        } else {
            (
                ChordVerdict::Wrong,
                format!(
                    "Wrong. The target notes were {}, but {} were detected.",
                    join(target),
                    join(&judged)
                ),
            )
        };

        if named.len() > required_count {
            feedback.push_str(&format!(
                " ({} extra notes detected.)",
                named.len() - required_count
            ));
        }

        log::debug!("chord {} judged as {:?}", join(target), verdict);

        ChordComparison {
            matched: !matches!(verdict, ChordVerdict::Wrong),
            verdict,
            judged,
            feedback,
        }
    }
}
