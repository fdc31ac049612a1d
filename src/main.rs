//! Dubflow - dubbing preparation pipeline
//!
//! Turns a source-language video into the artifacts a dubbing studio
//! needs: a word-aligned transcript, an entity-protected translation,
//! and per-segment SSML prosody markup, using ffmpeg, a whisper CLI,
//! and a seq2seq inference server.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dubflow::cli::{Args, Commands};
use dubflow::config::Config;
use dubflow::workflow::{read_json, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration before logging so the log directory is known
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    setup_logging(args.verbose, &config.log_dir)?;
    info!("Starting dubflow");

    let workflow = Workflow::new(config)?;

    match args.command {
        Commands::Process { input } => {
            workflow.process_single_file(&input).await?;
        }
        Commands::Batch { input_dir } => {
            workflow.process_directory(&input_dir).await?;
        }
        Commands::Extract { input } => {
            let paths = workflow.stage_paths(&input)?;
            workflow
                .run_extract(&input, &paths.normalized_audio, &paths.clean_audio)
                .await?;
            println!("Normalized audio: {}", paths.normalized_audio.display());
            println!("Clean audio: {}", paths.clean_audio.display());
        }
        Commands::Transcribe { input, output } => {
            workflow.run_transcribe(&input, &output).await?;
        }
        Commands::Align {
            audio,
            transcript,
            output,
        } => {
            let transcript = read_json(&transcript).await?;
            workflow.run_align(&audio, &transcript, &output).await?;
        }
        Commands::Normalize { input, output, srt } => {
            let aligned = read_json(&input).await?;
            workflow.run_normalize(&aligned, &output, &srt).await?;
        }
        Commands::Translate {
            input,
            output,
            srt,
            report,
        } => {
            let transcript = read_json(&input).await?;
            workflow
                .run_translate(&transcript, &output, &srt, &report)
                .await?;
        }
        Commands::Prosody {
            aligned,
            translated,
            audio,
            output,
            preview,
            report,
        } => {
            let aligned = read_json(&aligned).await?;
            let translated = read_json(&translated).await?;
            workflow
                .run_prosody(&aligned, &translated, &audio, &output, &preview, &report)
                .await?;
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool, log_dir: &str) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    // File appender with daily rotation
    let file_appender = rolling::daily(log_dir, "dubflow.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
