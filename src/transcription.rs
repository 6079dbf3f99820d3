use serde::{Deserialize, Serialize};

// Structs for parsing whisper.cpp JSON output (`-oj`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOutput {
    pub result: WhisperCppResult,
    pub transcription: Vec<WhisperCppSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppSegment {
    pub offsets: WhisperCppOffsets,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOffsets {
    pub from: i64,
    pub to: i64,
}

/// A time-coded span of subtitle text, timing in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TimedSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Same timing, different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            start: self.start,
            end: self.end,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<TimedSegment>,
    pub language: String,
}

impl From<WhisperCppOutput> for Transcription {
    fn from(whisper_output: WhisperCppOutput) -> Self {
        let language = whisper_output.result.language;

        let segments: Vec<TimedSegment> = whisper_output
            .transcription
            .into_iter()
            .map(|seg| {
                let start = seg.offsets.from.max(0) as f64 / 1000.0; // Convert ms to seconds
                let end = seg.offsets.to.max(0) as f64 / 1000.0;
                TimedSegment::new(start, end, seg.text.trim())
            })
            .filter(|seg| !seg.text.is_empty())
            .collect();

        let text = segments
            .iter()
            .map(|seg| seg.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Transcription {
            text,
            segments,
            language,
        }
    }
}
