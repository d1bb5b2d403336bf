//! # Audition - Music Workshop Scoring
//!
//! Command-line front-end for the audio performance analysis engine.
//! Recorded answers are decoded and scored in one pass; live listening
//! runs capture and analysis on a dedicated thread.
//!
//! ## Architecture
//! - **Main Thread**: argument parsing, target loading, result printing
//! - **Audio Thread**: live window analysis with a `ListeningSession`
//! - **Communication**: Crossbeam channels for audio windows and shutdown

mod audio;
mod cli;
mod config;
mod decode;
mod targets;

use anyhow::{Context, Result};
use audition_core::{
    AnalysisConfig, Analyzer, ListeningSession, NoteFrequencyTable, NoteName, SampleWindow,
};
use clap::Parser;
use cpal::traits::StreamTrait;
use serde::Serialize;
use std::thread;
use std::time::Duration;

use cli::{Cli, Command};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Listen { seconds } => listen(config, Duration::from_secs(seconds)),
        Command::Note { recording, target } => {
            let target = target
                .parse::<NoteName>()
                .with_context(|| format!("Invalid note name: {target}"))?;
            let recording = decode::decode_recording(&recording)?;
            let analyzer = Analyzer::new(config)?;
            print_json(&analyzer.analyze_note(
                &recording.samples,
                recording.sample_rate as f32,
                &target,
            ))
        }
        Command::Chord { recording, target } => {
            let target = targets::parse_notes(&target)?;
            let recording = decode::decode_recording(&recording)?;
            let analyzer = Analyzer::new(config)?;
            print_json(&analyzer.analyze_chord(
                &recording.samples,
                recording.sample_rate as f32,
                &target,
            ))
        }
        Command::Melody { recording, target } => {
            let target = targets::load_melody(&target)?;
            let recording = decode::decode_recording(&recording)?;
            let analyzer = Analyzer::new(config)?;
            print_json(&analyzer.analyze_melody(
                &recording.samples,
                recording.sample_rate as f32,
                &target,
                NoteFrequencyTable::standard(),
            ))
        }
        Command::Rhythm { recording, target } => {
            let target = targets::load_rhythm(&target)?;
            let recording = decode::decode_recording(&recording)?;
            let analyzer = Analyzer::new(config)?;
            print_json(&analyzer.analyze_rhythm(
                &recording.samples,
                recording.sample_rate as f32,
                &target,
            ))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// What a listening run leaves behind.
#[derive(Debug, Serialize)]
struct ListenSummary {
    captured_notes: Vec<String>,
    beat_times_ms: Vec<f64>,
}

/// Captures from the default input device for `duration`, analysing every
/// window on a dedicated thread, then prints the captured notes and beats.
fn listen(config: AnalysisConfig, duration: Duration) -> Result<()> {
    let window_size = config.tracker.window_size;
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
    let (raw_audio_tx, raw_audio_rx) = crossbeam_channel::bounded::<audio::CapturedWindow>(32);

    log::info!("Attempting to start audio capture...");
    let (stream, sample_rate) = audio::start_audio_capture(raw_audio_tx, window_size)
        .context("Failed to start audio capture")?;
    log::info!("Audio capture started, listening for {}s", duration.as_secs());

    let mut session = ListeningSession::new(config.pitch, config.beat, config.capture);
    let worker = thread::spawn(move || {
        loop {
            crossbeam_channel::select! {
                recv(raw_audio_rx) -> msg => match msg {
                    Ok(captured) => {
                        let now_ms = captured.end_ms(sample_rate);
                        let window = SampleWindow::new(&captured.samples, sample_rate as f32);
                        let frame = session.process(&window, now_ms);
                        if frame.beat {
                            log::info!("Beat at {:.0} ms", now_ms);
                        }
                        if let (Some(note), Some(cents)) = (frame.note, frame.cents_deviation) {
                            log::debug!(
                                "{} ({:+.1} cents), level {:.0}",
                                note,
                                cents,
                                frame.level
                            );
                        }
                    }
                    Err(_) => {
                        log::warn!("Audio channel closed");
                        break;
                    }
                },
                recv(shutdown_rx) -> _ => {
                    log::info!("Received shutdown signal");
                    break;
                },
            }
        }
        session
    });

    thread::sleep(duration);

    if let Err(e) = stream.pause() {
        log::warn!("Error pausing stream: {}", e);
    }
    let _ = shutdown_tx.send(());
    let session = worker
        .join()
        .map_err(|_| anyhow::anyhow!("Audio thread panicked"))?;
    drop(stream);

    print_json(&ListenSummary {
        captured_notes: session
            .captured_notes()
            .iter()
            .map(ToString::to_string)
            .collect(),
        beat_times_ms: session.beat_times().to_vec(),
    })
}
