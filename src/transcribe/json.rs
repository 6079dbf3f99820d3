use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::error::{Result, SubgenError};
use crate::transcription::Transcription;
use super::Transcriber;

/// Loads a transcription previously written by the `transcribe` command.
/// The language hint is ignored; the file records the detected language.
pub struct JsonTranscriptLoader;

#[async_trait]
impl Transcriber for JsonTranscriptLoader {
    async fn transcribe(&self, media_path: &Path, _language: Option<&str>) -> Result<Transcription> {
        if !media_path.exists() {
            return Err(SubgenError::FileNotFound(media_path.display().to_string()));
        }

        let content = tokio::fs::read_to_string(media_path).await?;
        let transcription: Transcription = serde_json::from_str(&content)?;
        info!(
            "Loaded transcription from {} ({} segments, language '{}')",
            media_path.display(),
            transcription.segments.len(),
            transcription.language
        );

        Ok(transcription)
    }
}

/// Save a transcription as pretty JSON
pub async fn save_transcription<P: AsRef<Path>>(transcription: &Transcription, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let content = serde_json::to_string_pretty(transcription)?;
    tokio::fs::write(path, content).await?;
    info!("Saved transcription to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::TimedSegment;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/talk.json");
        let transcription = Transcription {
            text: "Hello. Bye.".to_string(),
            segments: vec![
                TimedSegment::new(0.0, 1.0, "Hello."),
                TimedSegment::new(1.0, 2.0, "Bye."),
            ],
            language: "en".to_string(),
        };

        save_transcription(&transcription, &path).await.unwrap();
        let loaded = JsonTranscriptLoader.transcribe(&path, Some("fr")).await.unwrap();

        assert_eq!(loaded.language, "en");
        assert_eq!(loaded.segments, transcription.segments);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = JsonTranscriptLoader
            .transcribe(Path::new("/nonexistent/talk.json"), None)
            .await;
        assert!(matches!(result, Err(SubgenError::FileNotFound(_))));
    }
}
