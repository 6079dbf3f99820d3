use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcriber error: {0}")]
    Transcriber(String),

    /// A single backend call failed (transport, service side, timeout or empty result)
    #[error("{service} failed: {message}")]
    Backend { service: String, message: String },

    /// A backend answered but the result did not pass validation
    #[error("Translation quality check failed for {service}")]
    QualityRejected { service: String },

    /// Every backend failed or was rejected on every sweep for one chunk
    #[error("Translation failed after {attempts} attempts with all {backends} services")]
    ChunkTranslationExhausted { attempts: u32, backends: usize },

    #[error("Translation failed at chunk {chunk_index}/{total_chunks}: {source}")]
    TranslationFailed {
        chunk_index: usize,
        total_chunks: usize,
        #[source]
        source: Box<SubgenError>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl SubgenError {
    pub fn backend(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            service: service.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SubgenError>;
