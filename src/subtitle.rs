use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

use crate::error::{Result, SubgenError};
use crate::transcription::TimedSegment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            _ => Err(SubgenError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialize segments into subtitle file content
pub fn format_subtitles(segments: &[TimedSegment], format: SubtitleFormat) -> String {
    let mut content = String::new();

    if format == SubtitleFormat::Vtt {
        content.push_str("WEBVTT\n\n");
    }

    for (index, segment) in segments.iter().enumerate() {
        let start_time = format_timestamp(segment.start, format);
        let end_time = format_timestamp(segment.end, format);

        if format == SubtitleFormat::Srt {
            content.push_str(&format!("{}\n", index + 1));
        }
        content.push_str(&format!(
            "{} --> {}\n{}\n\n",
            start_time,
            end_time,
            segment.text.trim()
        ));
    }

    content
}

/// Write subtitle file, creating the parent directory if needed
pub async fn write_subtitles<P: AsRef<Path>>(
    segments: &[TimedSegment],
    output_path: P,
    format: SubtitleFormat,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating {} file: {}", format.extension().to_uppercase(), output_path.display());

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(output_path, format_subtitles(segments, format)).await?;

    info!("Subtitle file generated successfully ({} cues)", segments.len());
    Ok(())
}

/// Format time in seconds as HH:MM:SS,mmm (SRT) or HH:MM:SS.mmm (VTT)
fn format_timestamp(seconds: f64, format: SubtitleFormat) -> String {
    let total_milliseconds = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    let separator = match format {
        SubtitleFormat::Srt => ',',
        SubtitleFormat::Vtt => '.',
    };

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0, SubtitleFormat::Srt), "00:00:00,000");
        assert_eq!(format_timestamp(65.123, SubtitleFormat::Srt), "00:01:05,123");
        assert_eq!(format_timestamp(3661.5, SubtitleFormat::Srt), "01:01:01,500");
        assert_eq!(format_timestamp(3661.5, SubtitleFormat::Vtt), "01:01:01.500");
    }

    #[test]
    fn test_format_srt_and_vtt() {
        let segments = vec![
            TimedSegment::new(0.0, 1.5, " Bonjour. "),
            TimedSegment::new(1.5, 3.0, "Au revoir."),
        ];

        assert_eq!(
            format_subtitles(&segments, SubtitleFormat::Srt),
            "1\n00:00:00,000 --> 00:00:01,500\nBonjour.\n\n2\n00:00:01,500 --> 00:00:03,000\nAu revoir.\n\n"
        );
        assert_eq!(
            format_subtitles(&segments, SubtitleFormat::Vtt),
            "WEBVTT\n\n00:00:00.000 --> 00:00:01.500\nBonjour.\n\n00:00:01.500 --> 00:00:03.000\nAu revoir.\n\n"
        );
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("SRT".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Srt);
        assert_eq!("vtt".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Vtt);
        assert!(matches!(
            "ass".parse::<SubtitleFormat>(),
            Err(SubgenError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_write_subtitles_creates_parent_dirs() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.child("out/movie.vtt");
        let segments = vec![TimedSegment::new(0.0, 2.0, "Hola.")];

        write_subtitles(&segments, output.path(), SubtitleFormat::Vtt)
            .await
            .unwrap();

        output.assert("WEBVTT\n\n00:00:00.000 --> 00:00:02.000\nHola.\n\n");
    }
}
