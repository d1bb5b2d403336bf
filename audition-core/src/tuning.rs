//! # Musical Tuning Module
//!
//! Note naming and equal temperament frequency calculations shared by every
//! component of the engine.
//!
//! ## Features
//! - Strongly typed note names (`C#4`, `Db4`, `C-1` ... `G9`)
//! - 12-tone equal temperament against A4 = 440 Hz
//! - Frequency to note name rounding and its inverse
//! - Cent deviation between a measured and a reference frequency
//! - Note name to reference frequency lookup tables

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Reference pitch of A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI: i32 = 69;

/// The twelve pitch classes, spelled with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> PitchClass {
        Self::ALL[(index % 12) as usize]
    }

    fn as_str(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

/// A note in scientific pitch notation, restricted to the MIDI range.
///
/// Field order matters: the derived ordering sorts by octave first, which
/// is the same as sorting by pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteName {
    octave: i8,
    pitch_class: PitchClass,
}

impl NoteName {
    /// Builds a note, returning `None` outside MIDI 0..=127.
    pub fn new(pitch_class: PitchClass, octave: i8) -> Option<NoteName> {
        let note = NoteName { octave, pitch_class };
        (0..128).contains(&note.midi()).then_some(note)
    }

    pub fn from_midi(midi: u8) -> Option<NoteName> {
        if midi > 127 {
            return None;
        }
        let octave = (midi / 12) as i8 - 1;
        Some(NoteName {
            octave,
            pitch_class: PitchClass::from_index(midi % 12),
        })
    }

    pub fn midi(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.pitch_class.index() as i32
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.pitch_class
    }

    /// Equal temperament frequency of this note in Hz.
    pub fn frequency(&self) -> f32 {
        A4_FREQUENCY * 2.0_f32.powf((self.midi() - A4_MIDI) as f32 / 12.0)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class.as_str(), self.octave)
    }
}

/// Why a string could not be read as a note name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteParseError {
    #[error("empty note name")]
    Empty,
    #[error("unknown note letter in {0:?}")]
    UnknownLetter(String),
    #[error("invalid octave in {0:?}")]
    InvalidOctave(String),
    #[error("{0:?} is outside the MIDI range")]
    OutOfRange(String),
}

impl FromStr for NoteName {
    type Err = NoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars.next().ok_or(NoteParseError::Empty)?;
        let natural: i32 = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(NoteParseError::UnknownLetter(s.to_string())),
        };

        let rest = chars.as_str();
        let (accidental, octave_str) = match rest.chars().next() {
            Some('#') => (1, &rest[1..]),
            Some('b') => (-1, &rest[1..]),
            _ => (0, rest),
        };

        let octave: i32 = octave_str
            .parse()
            .map_err(|_| NoteParseError::InvalidOctave(s.to_string()))?;

        // Accidentals may cross the octave boundary (B#3 == C4, Cb4 == B3).
        let midi = (octave + 1) * 12 + natural + accidental;
        u8::try_from(midi)
            .ok()
            .and_then(NoteName::from_midi)
            .ok_or_else(|| NoteParseError::OutOfRange(s.to_string()))
    }
}

impl TryFrom<String> for NoteName {
    type Error = NoteParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NoteName> for String {
    fn from(note: NoteName) -> String {
        note.to_string()
    }
}

/// Converts a frequency to the nearest equal temperament note.
///
/// `noteIndex = round(12 * log2(freq / 440)) + 69`. Returns `None` for
/// non-positive or non-finite input and for results outside the MIDI range.
pub fn frequency_to_note_name(freq: f32) -> Option<NoteName> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }
    let midi = (12.0 * (freq / A4_FREQUENCY).log2()).round() as i32 + A4_MIDI;
    if !(0..128).contains(&midi) {
        return None;
    }
    NoteName::from_midi(midi as u8)
}

/// Inverse of [`frequency_to_note_name`].
pub fn note_name_to_frequency(note: &NoteName) -> f32 {
    note.frequency()
}

/// Calculates the deviation from a target frequency in cents.
///
/// 100 cents = 1 semitone. Positive values are sharp, negative values flat.
pub fn cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

/// Finds the closest note to a given frequency.
///
/// # Returns
/// * `Some((note, reference_frequency))` - Closest note and its 12-TET frequency
/// * `None` - The frequency does not map into the MIDI range
pub fn find_nearest_note(freq: f32) -> Option<(NoteName, f32)> {
    frequency_to_note_name(freq).map(|note| (note, note.frequency()))
}

/// Static mapping from note name to reference frequency.
///
/// Used by melody comparison to compute pitch deviation in cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteFrequencyTable {
    entries: BTreeMap<NoteName, f32>,
}

/// The 12-TET A4 = 440 Hz table for all 128 MIDI notes, computed once.
static STANDARD_TABLE: Lazy<NoteFrequencyTable> = Lazy::new(|| {
    let entries = (0..=127u8)
        .filter_map(NoteName::from_midi)
        .map(|note| (note, note.frequency()))
        .collect();
    NoteFrequencyTable { entries }
});

impl NoteFrequencyTable {
    pub fn standard() -> &'static NoteFrequencyTable {
        &STANDARD_TABLE
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (NoteName, f32)>,
    {
        NoteFrequencyTable {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn frequency(&self, note: &NoteName) -> Option<f32> {
        self.entries.get(note).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
