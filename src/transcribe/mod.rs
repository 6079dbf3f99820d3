// Transcription capability
//
// Speech-to-text is an external collaborator. Implementations:
// - WhisperCpp: extracts audio with ffmpeg and runs the whisper.cpp CLI
// - JsonFile: loads a transcription saved by a previous `transcribe` run

pub mod common;
pub mod json;
pub mod whisper_cpp;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::TranscriberConfig;
use crate::error::Result;
use crate::transcription::Transcription;

/// Main trait for transcription operations
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Produce text, time-coded segments and the detected language for a media file
    async fn transcribe(&self, media_path: &Path, language: Option<&str>) -> Result<Transcription>;
}

/// Transcriber implementation type
#[derive(Debug, Clone, Copy)]
pub enum TranscriberImplementation {
    WhisperCpp,
    JsonFile,
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create a transcriber based on implementation type
    pub fn create_transcriber(
        implementation: TranscriberImplementation,
        config: TranscriberConfig,
    ) -> Box<dyn Transcriber> {
        match implementation {
            TranscriberImplementation::WhisperCpp => {
                Box::new(whisper_cpp::WhisperCppTranscriber::new(config))
            }
            TranscriberImplementation::JsonFile => Box::new(json::JsonTranscriptLoader),
        }
    }

    /// Create with default implementation (whisper.cpp)
    pub fn create_default(config: TranscriberConfig) -> Box<dyn Transcriber> {
        Self::create_transcriber(TranscriberImplementation::WhisperCpp, config)
    }
}
