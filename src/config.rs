use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, SubgenError};
use crate::subtitle::SubtitleFormat;

fn default_chunk_size() -> usize {
    3000
}

fn default_context_aware() -> bool {
    true
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_rate_limit_delay_ms() -> u64 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub quality: QualityConfig,
    #[serde(default)]
    pub postprocess: PostProcessConfig,
    #[serde(default)]
    pub subtitle: SubtitleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to the whisper.cpp binary (e.g., whisper-cli)
    pub whisper_binary: String,
    /// Path to the ggml model file
    pub model_path: String,
    /// Path to ffmpeg, used to extract audio before transcription
    pub ffmpeg_binary: String,
    /// Number of threads passed to whisper.cpp
    #[serde(default)]
    pub threads: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityMode {
    /// Fast: single service, large chunks
    Fast,
    /// Balanced: speed and accuracy
    Balanced,
    /// High: small chunks, more retries
    High,
}

impl FromStr for QualityMode {
    type Err = SubgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "high" => Ok(Self::High),
            _ => Err(SubgenError::Config(format!(
                "Invalid translation quality '{}'. Valid modes: fast, balanced, high",
                s
            ))),
        }
    }
}

impl fmt::Display for QualityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Balanced => write!(f, "balanced"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Identifier of a translation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Google,
    MyMemory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::MyMemory => "mymemory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Quality preset controlling chunk size, retries and services
    pub quality_mode: QualityMode,
    /// Requested maximum chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Carry the tail of the previous translated chunk into the next request
    #[serde(default = "default_context_aware")]
    pub context_aware: bool,
    /// Explicit retry budget, overrides the quality preset
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Explicit service order, overrides the quality preset
    #[serde(default)]
    pub backends: Option<Vec<BackendKind>>,
    /// Base delay for exponential backoff between full service sweeps
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Courtesy pause between chunks
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,
    /// Upper bound for a single service call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub google_endpoint: String,
    pub mymemory_endpoint: String,
    /// Contact address sent to MyMemory for the higher anonymous quota
    #[serde(default)]
    pub mymemory_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Lowest accepted translated/original word-count ratio
    pub min_word_ratio: f64,
    /// Highest accepted translated/original word-count ratio
    pub max_word_ratio: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Characters replaced after translation, e.g. "?" -> "؟"
    #[serde(default)]
    pub punctuation_map: BTreeMap<String, String>,
    /// Right-to-left script
    #[serde(default)]
    pub rtl: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostProcessConfig {
    /// Per target language settings keyed by ISO 639-1 code
    pub languages: BTreeMap<String, LanguageProfile>,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        let rtl_profile = |pairs: &[(&str, &str)]| LanguageProfile {
            punctuation_map: pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            rtl: true,
        };

        let mut languages = BTreeMap::new();
        languages.insert("fa".to_string(), rtl_profile(&[("?", "؟"), (",", "،")]));
        languages.insert("ar".to_string(), rtl_profile(&[("?", "؟"), (",", "،")]));
        languages.insert("he".to_string(), rtl_profile(&[("?", "؟")]));
        languages.insert("ur".to_string(), rtl_profile(&[("?", "؟"), (",", "،")]));

        Self { languages }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleConfig {
    /// Default output format
    pub format: SubtitleFormat,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            format: SubtitleFormat::Srt,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcriber: TranscriberConfig {
                whisper_binary: "whisper-cli".to_string(),
                model_path: "models/ggml-base.bin".to_string(),
                ffmpeg_binary: "ffmpeg".to_string(),
                threads: None,
            },
            translate: TranslateConfig {
                quality_mode: QualityMode::Balanced,
                chunk_size: default_chunk_size(),
                context_aware: default_context_aware(),
                max_retries: None,
                backends: None,
                retry_delay_ms: default_retry_delay_ms(),
                rate_limit_delay_ms: default_rate_limit_delay_ms(),
                request_timeout_secs: default_request_timeout_secs(),
                google_endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
                mymemory_endpoint: "https://api.mymemory.translated.net/get".to_string(),
                mymemory_email: None,
            },
            quality: QualityConfig {
                min_word_ratio: 0.3,
                max_word_ratio: 3.0,
            },
            postprocess: PostProcessConfig::default(),
            subtitle: SubtitleConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubgenError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SubgenError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path, content)
            .map_err(|e| SubgenError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SubgenError::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.translate.chunk_size == 0 {
            return Err(SubgenError::Config("chunk_size must be positive".to_string()));
        }

        let quality = &self.quality;
        if quality.min_word_ratio < 0.0 || quality.max_word_ratio < quality.min_word_ratio {
            return Err(SubgenError::Config(format!(
                "Invalid word ratio bounds: {} .. {}",
                quality.min_word_ratio, quality.max_word_ratio
            )));
        }

        if let Some(backends) = &self.translate.backends {
            if backends.is_empty() {
                return Err(SubgenError::Config(
                    "backends override must name at least one service".to_string(),
                ));
            }
        }

        Ok(())
    }
}
