use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, SubgenError};
use crate::subtitle::{write_subtitles, SubtitleFormat};
use crate::transcribe::{json::save_transcription, Transcriber, TranscriberFactory, TranscriberImplementation};
use crate::transcription::{TimedSegment, Transcription};
use crate::translate::languages::normalize_code;
use crate::translate::{realign, TranslationOrchestrator, TranslationSettings};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Percentage of files that produced subtitles
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.succeeded.len() as f64 / self.total() as f64 * 100.0
    }
}

pub struct Workflow {
    config: Config,
    transcriber: Box<dyn Transcriber>,
    orchestrator: TranslationOrchestrator,
    settings: TranslationSettings,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriberFactory::create_default(config.transcriber.clone());
        let orchestrator = TranslationOrchestrator::from_config(&config)?;
        Ok(Self::with_components(config, transcriber, orchestrator))
    }

    pub fn with_components(
        config: Config,
        transcriber: Box<dyn Transcriber>,
        orchestrator: TranslationOrchestrator,
    ) -> Self {
        let settings = TranslationSettings::from_config(&config.translate);
        Self {
            config,
            transcriber,
            orchestrator,
            settings,
        }
    }

    pub fn settings(&self) -> &TranslationSettings {
        &self.settings
    }

    fn format(&self) -> SubtitleFormat {
        self.config.subtitle.format
    }

    /// Transcribe, translate and write subtitles for one video
    pub async fn process_single_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        target_lang: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        info!("Processing single file: {}", input_path.display());

        if !input_path.exists() {
            return Err(SubgenError::FileNotFound(input_path.display().to_string()));
        }

        let transcription = self.transcriber.transcribe(input_path, None).await?;
        info!(
            "Transcription completed: {} segments, detected language '{}'",
            transcription.segments.len(),
            transcription.language
        );

        let segments = self.translate_transcription(&transcription, target_lang, cancel).await?;
        write_subtitles(&segments, output_path, self.format()).await
    }

    /// Process every video under `input_dir`; one failing file never aborts the batch
    pub async fn process_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
        target_lang: &str,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(SubgenError::Config(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        let video_files = find_video_files(input_dir);
        info!("Found {} video files to process", video_files.len());

        let progress = ProgressBar::new(video_files.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut summary = BatchSummary::default();

        for video_path in video_files {
            let output_path = subtitle_output_path(&video_path, input_dir, output_dir, self.format());
            progress.set_message(video_path.display().to_string());

            match self.process_single_file(&video_path, &output_path, target_lang, cancel).await {
                Ok(()) => {
                    info!("Successfully processed: {}", video_path.display());
                    summary.succeeded.push(video_path);
                }
                Err(SubgenError::Cancelled) => {
                    progress.abandon();
                    return Err(SubgenError::Cancelled);
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", video_path.display(), e);
                    summary.failed.push((video_path, e.to_string()));
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            "Batch finished: {} succeeded, {} failed ({:.1}% success)",
            summary.succeeded.len(),
            summary.failed.len(),
            summary.success_rate()
        );

        Ok(summary)
    }

    /// Transcribe a video and save the transcription as JSON
    pub async fn transcribe_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        language: Option<&str>,
    ) -> Result<()> {
        let transcription = self.transcriber.transcribe(input_path.as_ref(), language).await?;
        save_transcription(&transcription, output_path).await
    }

    /// Translate a saved transcription and write subtitles
    pub async fn translate_transcript_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        target_lang: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let loader = TranscriberFactory::create_transcriber(
            TranscriberImplementation::JsonFile,
            self.config.transcriber.clone(),
        );
        let transcription = loader.transcribe(input_path.as_ref(), None).await?;

        let segments = self.translate_transcription(&transcription, target_lang, cancel).await?;
        write_subtitles(&segments, output_path, self.format()).await
    }

    async fn translate_transcription(
        &self,
        transcription: &Transcription,
        target_lang: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<TimedSegment>> {
        if !transcription.language.is_empty()
            && normalize_code(&transcription.language) == normalize_code(target_lang)
        {
            info!("Detected language matches target '{}', keeping original text", target_lang);
            return Ok(transcription.segments.clone());
        }

        let source_lang = if transcription.language.is_empty() {
            "auto"
        } else {
            transcription.language.as_str()
        };

        let translated = self
            .orchestrator
            .translate(&transcription.text, source_lang, target_lang, &self.settings, cancel)
            .await?;

        Ok(realign(&transcription.segments, &translated))
    }
}

/// Video files below `dir`, sorted for a stable processing order
pub fn find_video_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Mirror the video's path relative to `input_dir` under `output_dir`
fn subtitle_output_path(video_path: &Path, input_dir: &Path, output_dir: &Path, format: SubtitleFormat) -> PathBuf {
    let relative = pathdiff::diff_paths(video_path, input_dir)
        .or_else(|| video_path.file_name().map(PathBuf::from))
        .unwrap_or_else(|| video_path.to_path_buf());

    output_dir.join(relative).with_extension(format.extension())
}
