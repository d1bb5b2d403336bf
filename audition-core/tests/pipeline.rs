use audition_core::tuning::NoteFrequencyTable;
use audition_core::{Analyzer, NoteName, RhythmTarget, TargetNote};

const SAMPLE_RATE: f32 = 44100.0;

/// Appends `seconds` of a sine (or silence when `frequency` is `None`).
fn append(buffer: &mut Vec<f32>, frequency: Option<f32>, seconds: f32) {
    let count = (SAMPLE_RATE * seconds) as usize;
    for i in 0..count {
        let value = match frequency {
            Some(f) => 0.4 * (2.0 * std::f32::consts::PI * f * i as f32 / SAMPLE_RATE).sin(),
            None => 0.0,
        };
        buffer.push(value);
    }
}

fn note(name: &str) -> NoteName {
    name.parse().unwrap()
}

/// C4, E4, G4, half a second each, separated by short rests.
fn sung_arpeggio() -> Vec<f32> {
    let mut samples = Vec::new();
    append(&mut samples, None, 0.2);
    for name in ["C4", "E4", "G4"] {
        append(&mut samples, Some(note(name).frequency()), 0.5);
        append(&mut samples, None, 0.15);
    }
    samples
}

#[test]
fn melody_sung_in_tune_scores_high() {
    let analyzer = Analyzer::default();
    let samples = sung_arpeggio();

    let detected = analyzer.detect_notes(&samples, SAMPLE_RATE);
    let names: Vec<String> = detected
        .iter()
        .filter_map(|n| n.note_name.map(|name| name.to_string()))
        .collect();
    assert_eq!(names, ["C4", "E4", "G4"]);

    let target = vec![
        TargetNote::new(note("C4"), 0.5),
        TargetNote::new(note("E4"), 0.5),
        TargetNote::new(note("G4"), 0.5),
    ];
    let result = analyzer.analyze_melody(
        &samples,
        SAMPLE_RATE,
        &target,
        NoteFrequencyTable::standard(),
    );
    assert_eq!(result.sequence_score, 100.0);
    assert_eq!(result.pitch_score, 100.0);
    assert!(result.overall_score >= 70.0);
}

#[test]
fn same_recording_analyzed_twice_gives_same_result() {
    let analyzer = Analyzer::default();
    let samples = sung_arpeggio();
    let first = analyzer.detect_notes(&samples, SAMPLE_RATE);
    let second = analyzer.detect_notes(&samples, SAMPLE_RATE);
    assert_eq!(first, second);
}

#[test]
fn chord_sung_out_of_order_matches() {
    let analyzer = Analyzer::default();
    let result = analyzer.analyze_chord(
        &sung_arpeggio(),
        SAMPLE_RATE,
        &[note("G4"), note("C4"), note("E4")],
    );
    assert!(result.matched);
}

#[test]
fn single_note_picks_the_held_note() {
    let mut samples = Vec::new();
    append(&mut samples, Some(440.0), 0.8);
    append(&mut samples, None, 0.2);
    let result = Analyzer::default().analyze_note(&samples, SAMPLE_RATE, &note("A4"));
    assert!(result.matched, "{}", result.feedback);
}

#[test]
fn tapped_rhythm_is_scored() {
    // Four 30ms clicks on an even 400ms grid.
    let mut samples = Vec::new();
    for _ in 0..4 {
        let start = samples.len();
        samples.resize(start + (0.03 * SAMPLE_RATE) as usize, 0.8);
        append(&mut samples, None, 0.37);
    }
    let target = RhythmTarget::new(vec![0.0, 0.4, 0.8, 1.2]).unwrap();
    let result = Analyzer::default().analyze_rhythm(&samples, SAMPLE_RATE, &target);
    assert_eq!(result.score, 100.0);

    let wrong_count = RhythmTarget::new(vec![0.0, 0.4, 0.8]).unwrap();
    let result = Analyzer::default().analyze_rhythm(&samples, SAMPLE_RATE, &wrong_count);
    assert_eq!(result.score, 0.0);
}
