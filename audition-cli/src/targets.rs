//! Loading of the targets a learner is asked to reproduce.

use anyhow::{Context, Result};
use audition_core::{NoteName, RhythmTarget, TargetNote};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open target: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse target: {}", path.display()))
}

/// Reads `[{"note": "C4", "duration": 0.5}, ...]`.
pub fn load_melody(path: &Path) -> Result<Vec<TargetNote>> {
    let melody: Vec<TargetNote> = load_json(path)?;
    if let Some(bad) = melody.iter().find(|n| !(n.duration > 0.0)) {
        anyhow::bail!("Target note {} has a non-positive duration", bad.note);
    }
    Ok(melody)
}

/// Reads `{"times": [0.0, 0.25, ...]}`.
pub fn load_rhythm(path: &Path) -> Result<RhythmTarget> {
    load_json(path)
}

pub fn parse_notes(names: &[String]) -> Result<Vec<NoteName>> {
    names
        .iter()
        .map(|name| {
            name.parse::<NoteName>()
                .with_context(|| format!("Invalid note name: {name}"))
        })
        .collect()
}
