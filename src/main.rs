//! subgen - video subtitle generator
//!
//! Transcribes videos with whisper.cpp and translates the transcript through free web
//! translation services, writing SRT or WebVTT subtitles.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subgen::cli::{Args, Commands};
use subgen::config::Config;
use subgen::translate::languages::all_languages;
use subgen::workflow::Workflow;

const DEFAULT_CONFIG_FILE: &str = "subgen.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = load_config(args.config.as_deref())?;
    args.overrides.apply(&mut config)?;

    match &args.command {
        Commands::Languages => {
            println!("{:<8} {}", "Code", "Language");
            println!("{}", "-".repeat(32));
            for (code, name) in all_languages() {
                println!("{:<8} {}", code, name);
            }
            return Ok(());
        }
        Commands::Config { save } => {
            match save {
                Some(path) => {
                    config.save_to_file(path)?;
                    println!("Configuration written to {}", path.display());
                }
                None => print!("{}", config.to_toml()?),
            }
            return Ok(());
        }
        _ => {}
    }

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            ctrl_c_token.cancel();
        }
    });

    let workflow = Workflow::new(config)?;
    let settings = workflow.settings();
    info!(
        "Translation settings: {} mode, chunk size {}, {} retries, services {:?}",
        settings.quality_mode, settings.chunk_size, settings.max_retries, settings.backends
    );

    match args.command {
        Commands::Process { input, output, language } => {
            workflow
                .process_single_file(&input, &output, &language, &cancel)
                .await?;
            println!("Subtitles written to {}", output.display());
        }
        Commands::Batch { input_dir, output_dir, language } => {
            let summary = workflow
                .process_directory(&input_dir, &output_dir, &language, &cancel)
                .await?;

            println!("\nBatch summary:");
            println!("Processed: {}", summary.total());
            println!("Succeeded: {}", summary.succeeded.len());
            println!("Failed: {}", summary.failed.len());
            for (path, reason) in &summary.failed {
                println!("  {}: {}", path.display(), reason);
            }
            println!("Success rate: {:.1}%", summary.success_rate());
        }
        Commands::Transcribe { input, output, language } => {
            workflow
                .transcribe_to_file(&input, &output, language.as_deref())
                .await?;
            println!("Transcription written to {}", output.display());
        }
        Commands::Translate { input, output, language } => {
            workflow
                .translate_transcript_file(&input, &output, &language, &cancel)
                .await?;
            println!("Subtitles written to {}", output.display());
        }
        Commands::Languages | Commands::Config { .. } => {}
    }

    Ok(())
}

/// Explicit path, else ./subgen.toml when present, else defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
            Ok(Config::from_file(DEFAULT_CONFIG_FILE)?)
        }
        None => Ok(Config::default()),
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".subgen").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation; the guard must outlive the program
    let file_appender = rolling::daily(&log_dir, "subgen.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("subgen.log").display()
    );

    Ok(())
}
