use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, SubgenError};
use crate::transcription::{Transcription, WhisperCppOutput};
use super::{Transcriber, common::{ExternalCommand, extract_audio}};

/// whisper.cpp CLI transcriber
pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    /// Build the whisper.cpp invocation writing JSON to `<output_base>.json`
    pub fn build_command(
        &self,
        audio_path: &Path,
        output_base: &Path,
        language: Option<&str>,
    ) -> ExternalCommand {
        let mut cmd = ExternalCommand::new(&self.config.whisper_binary, "Whisper transcription")
            .option("-m", self.config.model_path.clone())
            .arg("-f")
            .path_arg(audio_path)
            .arg("-oj")
            .arg("-of")
            .path_arg(output_base)
            .option("-l", language.unwrap_or("auto"));

        if let Some(threads) = self.config.threads {
            cmd = cmd.option("-t", threads.to_string());
        }

        cmd
    }
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe(&self, media_path: &Path, language: Option<&str>) -> Result<Transcription> {
        if !media_path.exists() {
            return Err(SubgenError::FileNotFound(media_path.display().to_string()));
        }

        info!("Transcribing {} with whisper.cpp", media_path.display());

        let temp_dir = tempfile::tempdir()
            .map_err(|e| SubgenError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let audio_path = temp_dir.path().join("audio.wav");
        let output_base = temp_dir.path().join("transcript");

        extract_audio(&self.config.ffmpeg_binary, media_path, &audio_path).await?;

        self.build_command(&audio_path, &output_base, language)
            .execute()
            .await?;

        let json_file = output_base.with_extension("json");
        let json_content = tokio::fs::read_to_string(&json_file)
            .await
            .map_err(|e| SubgenError::Transcriber(format!("Failed to read output: {}", e)))?;

        let whisper_output: WhisperCppOutput = serde_json::from_str(&json_content)
            .map_err(|e| SubgenError::Transcriber(format!("Failed to parse whisper.cpp JSON: {}", e)))?;

        let transcription = Transcription::from(whisper_output);
        info!(
            "Transcription completed: {} segments, detected language '{}'",
            transcription.segments.len(),
            transcription.language
        );

        Ok(transcription)
    }
}
