use std::time::Duration;

use crate::config::{BackendKind, QualityMode, TranslateConfig};

/// Immutable per-call translation settings, derived from the quality mode
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationSettings {
    pub quality_mode: QualityMode,
    pub chunk_size: usize,
    pub context_aware: bool,
    /// Number of full service sweeps per chunk
    pub max_retries: u32,
    /// Services tried in order on every sweep
    pub backends: Vec<BackendKind>,
    /// Base delay, doubled after every failed sweep
    pub retry_delay: Duration,
    /// Pause between consecutive chunks
    pub rate_limit_delay: Duration,
    /// Bound for one service call
    pub call_timeout: Duration,
}

impl TranslationSettings {
    /// Apply the quality preset to the requested chunk size
    pub fn for_mode(quality_mode: QualityMode, requested_chunk_size: usize, context_aware: bool) -> Self {
        let requested_chunk_size = requested_chunk_size.max(1);

        let (chunk_size, max_retries, backends) = match quality_mode {
            QualityMode::Fast => (requested_chunk_size.min(5000), 2, vec![BackendKind::Google]),
            QualityMode::Balanced => (
                requested_chunk_size,
                3,
                vec![BackendKind::Google, BackendKind::MyMemory],
            ),
            QualityMode::High => (
                requested_chunk_size.min(2000),
                5,
                vec![BackendKind::Google, BackendKind::MyMemory],
            ),
        };

        Self {
            quality_mode,
            chunk_size,
            context_aware,
            max_retries,
            backends,
            retry_delay: Duration::from_secs(1),
            rate_limit_delay: Duration::from_millis(100),
            call_timeout: Duration::from_secs(30),
        }
    }

    /// Preset values plus any explicit overrides from the config file
    pub fn from_config(config: &TranslateConfig) -> Self {
        let mut settings = Self::for_mode(config.quality_mode, config.chunk_size, config.context_aware);

        if let Some(max_retries) = config.max_retries {
            settings.max_retries = max_retries;
        }
        if let Some(backends) = &config.backends {
            if !backends.is_empty() {
                settings.backends = backends.clone();
            }
        }
        settings.retry_delay = Duration::from_millis(config.retry_delay_ms);
        settings.rate_limit_delay = Duration::from_millis(config.rate_limit_delay_ms);
        settings.call_timeout = Duration::from_secs(config.request_timeout_secs.max(1));

        settings
    }
}
