use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, QualityMode};
use crate::error::Result;
use crate::subtitle::SubtitleFormat;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path (defaults to ./subgen.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that take precedence over the configuration file
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct Overrides {
    /// Translation quality preset: fast, balanced or high
    #[arg(long, global = true)]
    pub translation_quality: Option<QualityMode>,

    /// Maximum characters per translation request
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    /// Do not carry context between chunks
    #[arg(long, global = true)]
    pub no_context: bool,

    /// Subtitle format: srt or vtt
    #[arg(long, global = true)]
    pub format: Option<SubtitleFormat>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(mode) = self.translation_quality {
            config.translate.quality_mode = mode;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.translate.chunk_size = chunk_size;
        }
        if self.no_context {
            config.translate.context_aware = false;
        }
        if let Some(format) = self.format {
            config.subtitle.format = format;
        }
        config.validate()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe a video and write translated subtitles
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,

        /// Target language code
        #[arg(short, long)]
        language: String,
    },

    /// Process all video files in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory, mirrors the input layout
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Target language code
        #[arg(short, long)]
        language: String,
    },

    /// Transcribe a video and save the transcription as JSON
    Transcribe {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Source language hint
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Translate a saved transcription into subtitles
    Translate {
        /// Input transcription JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,

        /// Target language code
        #[arg(short, long)]
        language: String,
    },

    /// List supported language codes
    Languages,

    /// Print the effective configuration
    Config {
        /// Write it to this path instead
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_with_overrides() {
        let args = Args::parse_from([
            "subgen",
            "process",
            "-i",
            "movie.mp4",
            "-o",
            "movie.srt",
            "-l",
            "fr",
            "--translation-quality",
            "high",
            "--no-context",
            "--format",
            "vtt",
        ]);

        assert!(matches!(args.command, Commands::Process { ref language, .. } if language == "fr"));

        let mut config = Config::default();
        args.overrides.apply(&mut config).unwrap();
        assert_eq!(config.translate.quality_mode, QualityMode::High);
        assert!(!config.translate.context_aware);
        assert_eq!(config.subtitle.format, SubtitleFormat::Vtt);
    }

    #[test]
    fn test_rejects_unknown_quality_mode() {
        let result = Args::try_parse_from(["subgen", "--translation-quality", "ultra", "languages"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_chunk_size_fails_validation() {
        let args = Args::parse_from(["subgen", "--chunk-size", "0", "languages"]);
        let mut config = Config::default();
        assert!(args.overrides.apply(&mut config).is_err());
    }
}
