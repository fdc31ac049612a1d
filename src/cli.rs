use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full dubbing-preparation pipeline on one video file
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Run the full pipeline over every video file in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,
    },

    /// Extract normalized and cleaned audio from a video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Transcribe a prepared WAV file
    Transcribe {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output transcript JSON
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Align transcript words against audio
    Align {
        /// Input audio file
        #[arg(short, long)]
        audio: PathBuf,

        /// Input transcript JSON
        #[arg(short, long)]
        transcript: PathBuf,

        /// Output aligned JSON
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Normalize transcript text (truecasing, IP repair, glossary)
    Normalize {
        /// Input aligned transcript JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output normalized JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Output source-language SRT
        #[arg(long)]
        srt: PathBuf,
    },

    /// Translate a normalized transcript with entity protection
    Translate {
        /// Input normalized transcript JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output translated JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Output target-language SRT
        #[arg(long)]
        srt: PathBuf,

        /// Output diagnostic report JSON
        #[arg(short, long)]
        report: PathBuf,
    },

    /// Synthesize prosody markup from aligned and translated transcripts
    Prosody {
        /// Input aligned (normalized) transcript JSON
        #[arg(short, long)]
        aligned: PathBuf,

        /// Input translated JSON
        #[arg(short, long)]
        translated: PathBuf,

        /// Clean audio WAV used for pitch analysis
        #[arg(long)]
        audio: PathBuf,

        /// Output SSML JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Output preview SRT
        #[arg(long)]
        preview: PathBuf,

        /// Output diagnostic report JSON
        #[arg(short, long)]
        report: PathBuf,
    },
}
