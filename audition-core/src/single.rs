//! Single-note check: did the learner hold the requested note?

use crate::segment::NoteEvent;
use crate::tuning::NoteName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleNoteComparison {
    #[serde(rename = "match")]
    pub matched: bool,
    /// The longest named note, which is taken as the learner's answer.
    pub detected: Option<NoteEvent>,
    pub feedback: String,
}

/// Judges the longest detected note that has a name against `target`.
pub fn compare_single_note(target: &NoteName, detected: &[NoteEvent]) -> SingleNoteComparison {
    if detected.is_empty() {
        return SingleNoteComparison {
            matched: false,
            detected: None,
            feedback: "No notes were detected.".to_string(),
        };
    }

    // First of the longest wins on ties.
    let longest = detected
        .iter()
        .filter(|n| n.note_name.is_some())
        .fold(None::<&NoteEvent>, |best, n| match best {
            Some(b) if b.duration >= n.duration => Some(b),
            _ => Some(n),
        });

    let Some((event, name)) = longest.and_then(|n| n.note_name.map(|name| (n, name))) else {
        return SingleNoteComparison {
            matched: false,
            detected: None,
            feedback: "No meaningful note was detected.".to_string(),
        };
    };

    let matched = *target == name;
    let feedback = if matched {
        format!("Correct! The target ({target}) matches the most prominent detected note ({name}).")
    } else {
        format!("Wrong. The target was {target}, but the most prominent detected note was {name}.")
    };

    SingleNoteComparison {
        matched,
        detected: Some(event.clone()),
        feedback,
    }
}
