use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{BackendKind, Config};
use crate::error::{Result, SubgenError};
use super::backend::{BackendFactory, TranslationBackend};
use super::languages::{display_name, is_supported, normalize_code};
use super::postprocess::PostProcessor;
use super::settings::TranslationSettings;
use super::splitter::split_text;
use super::validator::QualityValidator;
use super::{TranslationRequest, TranslationResult};

/// Chunked, sequential translation with per-chunk service fallback
pub struct TranslationOrchestrator {
    backends: Vec<Arc<dyn TranslationBackend>>,
    validator: QualityValidator,
    post_processor: PostProcessor,
}

impl TranslationOrchestrator {
    pub fn new(
        backends: Vec<Arc<dyn TranslationBackend>>,
        validator: QualityValidator,
        post_processor: PostProcessor,
    ) -> Self {
        Self {
            backends,
            validator,
            post_processor,
        }
    }

    /// Orchestrator over every known service, with validation and post-processing from config
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            BackendFactory::create_backends(&config.translate)?,
            QualityValidator::from_config(&config.quality),
            PostProcessor::new(&config.postprocess),
        ))
    }

    /// Translate `text` chunk by chunk.
    ///
    /// Fails with `TranslationFailed` only when some chunk exhausted every service on every
    /// sweep; nothing is returned for the chunks translated before it.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        settings: &TranslationSettings,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if normalize_code(source_lang) == normalize_code(target_lang) {
            debug!("Source and target language are both {}, skipping translation", target_lang);
            return Ok(text.to_string());
        }

        if !is_supported(target_lang) {
            return Err(SubgenError::UnsupportedLanguage(target_lang.to_string()));
        }

        let backends = self.resolve_backends(&settings.backends)?;
        let chunks = split_text(text, settings.chunk_size);
        let total_chunks = chunks.len();

        info!(
            "Translating {} chars {} -> {} ({} mode, chunk size {}, {} chunks)",
            text.chars().count(),
            source_lang,
            display_name(target_lang),
            settings.quality_mode,
            settings.chunk_size,
            total_chunks
        );

        let mut translated_chunks: Vec<String> = Vec::with_capacity(total_chunks);

        for (index, chunk) in chunks.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(SubgenError::Cancelled);
            }
            if index > 0 {
                pause(settings.rate_limit_delay, cancel).await?;
            }

            let context = if settings.context_aware {
                translated_chunks.last().and_then(|previous| context_fragment(previous))
            } else {
                None
            };

            let request = TranslationRequest {
                text: match &context {
                    Some(context) => format!("{} {}", context, chunk),
                    None => chunk.clone(),
                },
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            };

            info!("┌─ Chunk {}/{} ({} chars)", index + 1, total_chunks, chunk.chars().count());

            let result = self
                .translate_chunk(&request, &backends, settings, cancel)
                .await
                .map_err(|e| match e {
                    SubgenError::Cancelled => SubgenError::Cancelled,
                    other => SubgenError::TranslationFailed {
                        chunk_index: index + 1,
                        total_chunks,
                        source: Box::new(other),
                    },
                })?;

            info!("└─ Chunk {}/{} accepted from {}", index + 1, total_chunks, result.service);

            let translated = if context.is_some() {
                strip_context(&result.text)
            } else {
                result.text
            };

            translated_chunks.push(self.post_processor.process(&translated, target_lang));
        }

        Ok(self.post_processor.process(&translated_chunks.join(" "), target_lang))
    }

    /// Services in the requested order, taken from the registry
    fn resolve_backends(&self, kinds: &[BackendKind]) -> Result<Vec<Arc<dyn TranslationBackend>>> {
        if kinds.is_empty() {
            return Err(SubgenError::Config("No translation services configured".to_string()));
        }

        kinds
            .iter()
            .map(|kind| {
                self.backends
                    .iter()
                    .find(|backend| backend.kind() == *kind)
                    .cloned()
                    .ok_or_else(|| {
                        SubgenError::Config(format!("Translation service '{}' is not available", kind))
                    })
            })
            .collect()
    }

    /// Up to `max_retries` sweeps over the services; the first validated answer wins
    async fn translate_chunk(
        &self,
        request: &TranslationRequest,
        backends: &[Arc<dyn TranslationBackend>],
        settings: &TranslationSettings,
        cancel: &CancellationToken,
    ) -> Result<TranslationResult> {
        for attempt in 0..settings.max_retries {
            for backend in backends {
                let service = backend.kind();

                match self.call_backend(backend.as_ref(), request, settings.call_timeout, cancel).await {
                    Ok(text)
                        if self.validator.validate(
                            &request.text,
                            &text,
                            &request.source_lang,
                            &request.target_lang,
                        ) =>
                    {
                        return Ok(TranslationResult { text, service });
                    }
                    Ok(_) => {
                        let rejected = SubgenError::QualityRejected {
                            service: service.to_string(),
                        };
                        warn!("│ {}", rejected);
                    }
                    Err(SubgenError::Cancelled) => return Err(SubgenError::Cancelled),
                    Err(e) => warn!("│ {}", e),
                }
            }

            if attempt + 1 < settings.max_retries {
                let delay = backoff_delay(settings.retry_delay, attempt);
                warn!(
                    "│ All services failed (attempt {}/{}), retrying in {:?}",
                    attempt + 1,
                    settings.max_retries,
                    delay
                );
                pause(delay, cancel).await?;
            }
        }

        Err(SubgenError::ChunkTranslationExhausted {
            attempts: settings.max_retries,
            backends: backends.len(),
        })
    }

    /// One bounded service call; a timeout is an ordinary service failure
    async fn call_backend(
        &self,
        backend: &dyn TranslationBackend,
        request: &TranslationRequest,
        call_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let service = backend.kind();
        let call = tokio::time::timeout(
            call_timeout,
            backend.translate_text(&request.text, &request.source_lang, &request.target_lang),
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SubgenError::Cancelled),
            outcome = call => match outcome {
                Ok(result) => result,
                Err(_) => Err(SubgenError::backend(
                    service.as_str(),
                    format!("timed out after {:?}", call_timeout),
                )),
            },
        }
    }
}

/// `retry_delay * 2^attempt`, saturating
fn backoff_delay(retry_delay: Duration, attempt: u32) -> Duration {
    retry_delay.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
}

async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    if delay.is_zero() {
        return if cancel.is_cancelled() {
            Err(SubgenError::Cancelled)
        } else {
            Ok(())
        };
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SubgenError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

/// Second-to-last '.'-separated piece of the previous output, if it has more than one
fn context_fragment(previous: &str) -> Option<String> {
    let parts: Vec<&str> = previous.split('.').collect();
    if parts.len() < 2 {
        return None;
    }

    let sentence = parts[parts.len() - 2].trim();
    if sentence.is_empty() {
        None
    } else {
        Some(format!("{}.", sentence))
    }
}

/// Drop everything up to and including the first '.'. Lossy if the service merged or
/// reordered the context sentence.
fn strip_context(translated: &str) -> String {
    match translated.split_once('.') {
        Some((_, rest)) => rest.to_string(),
        None => translated.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::backend::MockTranslationBackend;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn settings(backends: Vec<BackendKind>, max_retries: u32) -> TranslationSettings {
        TranslationSettings {
            max_retries,
            backends,
            retry_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
            ..TranslationSettings::for_mode(crate::config::QualityMode::Balanced, 3000, true)
        }
    }

    fn orchestrator(backends: Vec<Arc<dyn TranslationBackend>>) -> TranslationOrchestrator {
        TranslationOrchestrator::new(backends, QualityValidator::default(), PostProcessor::default())
    }

    fn mock(kind: BackendKind) -> MockTranslationBackend {
        let mut backend = MockTranslationBackend::new();
        backend.expect_kind().return_const(kind);
        backend
    }

    /// Sleeps far longer than any test timeout
    struct SlowBackend;

    #[async_trait]
    impl TranslationBackend for SlowBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Google
        }

        async fn translate_text(&self, text: &str, _source_lang: &str, _target_lang: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(text.to_string())
        }
    }

    #[tokio::test]
    async fn test_same_language_makes_no_calls() {
        let mut google = mock(BackendKind::Google);
        google.expect_translate_text().times(0);

        let orchestrator = orchestrator(vec![Arc::new(google)]);
        let result = orchestrator
            .translate(
                "Hello world.",
                "en",
                "EN",
                &settings(vec![BackendKind::Google], 3),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result, "Hello world.");
    }

    #[tokio::test]
    async fn test_falls_back_to_next_service_within_one_sweep() {
        let mut google = mock(BackendKind::Google);
        google
            .expect_translate_text()
            .times(1)
            .returning(|_, _, _| Err(SubgenError::backend("google", "HTTP 429")));

        let mut mymemory = mock(BackendKind::MyMemory);
        mymemory
            .expect_translate_text()
            .times(1)
            .returning(|_, _, _| Ok("Bonjour le monde.".to_string()));

        let orchestrator = orchestrator(vec![Arc::new(google), Arc::new(mymemory)]);
        let result = orchestrator
            .translate(
                "Hello the world.",
                "en",
                "fr",
                &settings(vec![BackendKind::Google, BackendKind::MyMemory], 3),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result, "Bonjour le monde.");
    }

    #[tokio::test]
    async fn test_rejected_result_falls_through() {
        let mut google = mock(BackendKind::Google);
        google
            .expect_translate_text()
            .times(1)
            .returning(|text, _, _| Ok(text.to_uppercase()));

        let mut mymemory = mock(BackendKind::MyMemory);
        mymemory
            .expect_translate_text()
            .times(1)
            .returning(|_, _, _| Ok("Hallo Welt".to_string()));

        let orchestrator = orchestrator(vec![Arc::new(google), Arc::new(mymemory)]);
        let result = orchestrator
            .translate(
                "hello world",
                "en",
                "de",
                &settings(vec![BackendKind::Google, BackendKind::MyMemory], 1),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result, "Hallo Welt");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_max_retries_sweeps() {
        let mut google = mock(BackendKind::Google);
        google
            .expect_translate_text()
            .times(3)
            .returning(|_, _, _| Err(SubgenError::backend("google", "unavailable")));

        let mut mymemory = mock(BackendKind::MyMemory);
        mymemory
            .expect_translate_text()
            .times(3)
            .returning(|_, _, _| Err(SubgenError::backend("mymemory", "unavailable")));

        let mut settings = settings(vec![BackendKind::Google, BackendKind::MyMemory], 3);
        settings.retry_delay = Duration::from_secs(1);

        let orchestrator = orchestrator(vec![Arc::new(google), Arc::new(mymemory)]);
        let started = tokio::time::Instant::now();
        let err = orchestrator
            .translate("Hello world.", "en", "fr", &settings, &CancellationToken::new())
            .await
            .unwrap_err();

        // 1s + 2s of backoff between the three sweeps
        assert_eq!(started.elapsed(), Duration::from_secs(3));

        match err {
            SubgenError::TranslationFailed {
                chunk_index,
                total_chunks,
                source,
            } => {
                assert_eq!((chunk_index, total_chunks), (1, 1));
                assert!(matches!(
                    *source,
                    SubgenError::ChunkTranslationExhausted { attempts: 3, backends: 2 }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_chunks() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();

        let mut google = mock(BackendKind::Google);
        google.expect_translate_text().returning(move |text, _, _| {
            let mut calls = counter.lock().unwrap();
            *calls += 1;
            if *calls == 1 {
                Ok(text.replace('e', "3"))
            } else {
                Err(SubgenError::backend("google", "quota exceeded"))
            }
        });

        let mut settings = settings(vec![BackendKind::Google], 2);
        settings.chunk_size = 20;
        settings.context_aware = false;

        let orchestrator = orchestrator(vec![Arc::new(google)]);
        let err = orchestrator
            .translate(
                "One sentence here. Two sentence here. Three more here.",
                "en",
                "fr",
                &settings,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SubgenError::TranslationFailed { chunk_index: 2, total_chunks: 3, .. }
        ));
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_context_is_prepended_and_stripped() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        let mut google = mock(BackendKind::Google);
        google.expect_translate_text().times(2).returning(move |text, _, _| {
            seen.lock().unwrap().push(text.to_string());
            Ok(text.replace('e', "3"))
        });

        let mut settings = settings(vec![BackendKind::Google], 1);
        settings.chunk_size = 45;

        let orchestrator = orchestrator(vec![Arc::new(google)]);
        let result = orchestrator
            .translate(
                "First sentence here. Second sentence here. Third one now.",
                "en",
                "fr",
                &settings,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0], "First sentence here. Second sentence here.");
        assert_eq!(requests[1], "S3cond s3nt3nc3 h3r3. Third one now.");
        assert_eq!(result, "First s3nt3nc3 h3r3. S3cond s3nt3nc3 h3r3. Third on3 now.");
    }

    #[tokio::test]
    async fn test_output_is_post_processed() {
        let mut google = mock(BackendKind::Google);
        google
            .expect_translate_text()
            .returning(|_, _, _| Ok("  سلام ,  حال شما چطور است ?".to_string()));

        let orchestrator = TranslationOrchestrator::new(
            vec![Arc::new(google)],
            QualityValidator::default(),
            PostProcessor::new(&crate::config::PostProcessConfig::default()),
        );
        let result = orchestrator
            .translate(
                "Hello, how are you?",
                "en",
                "fa",
                &settings(vec![BackendKind::Google], 1),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result, "سلام، حال شما چطور است؟");
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_falls_through() {
        let mut mymemory = mock(BackendKind::MyMemory);
        mymemory
            .expect_translate_text()
            .times(1)
            .returning(|_, _, _| Ok("Hola mundo".to_string()));

        let mut settings = settings(vec![BackendKind::Google, BackendKind::MyMemory], 1);
        settings.call_timeout = Duration::from_secs(30);

        let orchestrator = orchestrator(vec![Arc::new(SlowBackend), Arc::new(mymemory)]);
        let started = tokio::time::Instant::now();
        let result = orchestrator
            .translate("Hello world", "en", "es", &settings, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result, "Hola mundo");
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_in_flight_call() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let orchestrator = orchestrator(vec![Arc::new(SlowBackend)]);
        let err = orchestrator
            .translate("Hello world", "en", "es", &settings(vec![BackendKind::Google], 3), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, SubgenError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_calls() {
        let mut google = mock(BackendKind::Google);
        google.expect_translate_text().times(0);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let orchestrator = orchestrator(vec![Arc::new(google)]);
        let err = orchestrator
            .translate("Hello world", "en", "es", &settings(vec![BackendKind::Google], 3), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, SubgenError::Cancelled));
    }

    #[tokio::test]
    async fn test_rejects_unknown_language_and_missing_service() {
        let orchestrator = orchestrator(vec![Arc::new(mock(BackendKind::Google))]);
        let cancel = CancellationToken::new();

        let err = orchestrator
            .translate("Hello", "en", "xx", &settings(vec![BackendKind::Google], 1), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SubgenError::UnsupportedLanguage(code) if code == "xx"));

        let err = orchestrator
            .translate(
                "Hello",
                "en",
                "fr",
                &settings(vec![BackendKind::Google, BackendKind::MyMemory], 1),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubgenError::Config(_)));
    }

    #[test]
    fn test_context_helpers() {
        assert_eq!(context_fragment("Un. Deux. Trois").as_deref(), Some("Deux."));
        assert_eq!(context_fragment("Un. Deux."), Some("Deux.".to_string()));
        assert_eq!(context_fragment("Sans point"), None);
        assert_eq!(strip_context("Deux. Trois quatre."), " Trois quatre.");
        assert_eq!(strip_context("Rien a retirer"), "Rien a retirer");
    }

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(1));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(4));
    }
}
