use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "audition", about = "Scores sung and tapped music workshop answers")]
pub struct Cli {
    /// Analysis config file (TOML). Defaults to ./audition.toml when present.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Listen to the microphone and report captured notes and beats
    Listen {
        /// How long to listen for, in seconds
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,
    },

    /// Check that a recording holds the requested note
    Note {
        /// Recorded answer (WAV, MP3, FLAC, OGG)
        recording: PathBuf,
        /// Target note, e.g. A4
        #[arg(short, long)]
        target: String,
    },

    /// Check a sung dyad or triad, in any order
    Chord {
        recording: PathBuf,
        /// Target notes, e.g. C4,E4,G4
        #[arg(short, long, value_delimiter = ',', required = true)]
        target: Vec<String>,
    },

    /// Score a sung melody against a JSON target
    Melody {
        recording: PathBuf,
        /// JSON file: [{"note": "C4", "duration": 0.5}, ...]
        #[arg(short, long)]
        target: PathBuf,
    },

    /// Score a tapped rhythm against a JSON target
    Rhythm {
        recording: PathBuf,
        /// JSON file: {"times": [0.0, 0.25, 0.5, ...]} in seconds
        #[arg(short, long)]
        target: PathBuf,
    },
}
