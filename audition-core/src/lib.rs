// audition-core/src/lib.rs

//! The audio performance analysis engine of the music workshop.
//! Turns a recording or a live sample stream into detected pitches,
//! discrete note events, and scores against a target melody, chord,
//! single note or rhythm. It is completely headless and performs no I/O.

pub mod analyzer;
pub mod autocorr;
pub mod beat;
pub mod chord;
pub mod config;
pub mod melody;
pub mod pitch;
pub mod rhythm;
pub mod segment;
pub mod session;
pub mod single;
pub mod tracker;
pub mod tuning;
pub mod window;

pub use analyzer::Analyzer;
pub use beat::BeatDetector;
pub use chord::{ChordComparator, ChordComparison};
pub use config::{AnalysisConfig, ConfigError};
pub use melody::{MelodyComparator, MelodyComparison, TargetNote};
pub use pitch::{PitchDetector, PitchEstimate};
pub use rhythm::{RhythmComparator, RhythmComparison, RhythmTarget};
pub use segment::{NoteEvent, NoteSegmenter, PitchSample};
pub use session::{FrameAnalysis, ListeningSession};
pub use single::{SingleNoteComparison, compare_single_note};
pub use tracker::PitchTracker;
pub use tuning::{NoteFrequencyTable, NoteName};
pub use window::SampleWindow;
