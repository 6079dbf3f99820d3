use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, SubgenError};

/// External tool invocation (ffmpeg, whisper.cpp)
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl ExternalCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add a flag followed by its value
    pub fn option<S1: Into<String>, S2: Into<String>>(self, flag: S1, value: S2) -> Self {
        self.arg(flag).arg(value)
    }

    /// Run to completion, returning stdout
    pub async fn execute(&self) -> Result<String> {
        debug!("Executing {}: {} {:?}", self.description, self.binary_path, self.args);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| {
                SubgenError::Transcriber(format!("Failed to execute {}: {}", self.binary_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubgenError::Transcriber(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Build the ffmpeg command producing 16 kHz mono PCM, the input format whisper.cpp expects
pub fn audio_extraction_command<P: AsRef<Path>, Q: AsRef<Path>>(
    ffmpeg_path: &str,
    video_path: P,
    audio_path: Q,
) -> ExternalCommand {
    ExternalCommand::new(ffmpeg_path, "Audio extraction")
        .arg("-i")
        .path_arg(video_path)
        .arg("-vn")
        .option("-acodec", "pcm_s16le")
        .option("-ar", "16000")
        .option("-ac", "1")
        .arg("-y")
        .path_arg(audio_path)
}

/// Extract audio from video using ffmpeg
pub async fn extract_audio<P: AsRef<Path>, Q: AsRef<Path>>(
    ffmpeg_path: &str,
    video_path: P,
    audio_path: Q,
) -> Result<()> {
    let video_path = video_path.as_ref();
    let audio_path = audio_path.as_ref();

    info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());
    audio_extraction_command(ffmpeg_path, video_path, audio_path)
        .execute()
        .await?;
    info!("Audio extraction completed");

    Ok(())
}
