// Translation services
//
// Each service implements `TranslationBackend`. The orchestrator receives a registry of
// instances and picks them per call in the order given by `TranslationSettings::backends`.
// Adding a service means implementing the trait and registering it in `BackendFactory`.

pub mod google;
pub mod mymemory;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{BackendKind, TranslateConfig};
use crate::error::{Result, SubgenError};

/// A text translation service that may fail transiently
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Identifier used in settings and logs
    fn kind(&self) -> BackendKind;

    /// Translate `text`; `source_lang` may be "auto"
    async fn translate_text(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

/// Factory for creating translation service clients
pub struct BackendFactory;

impl BackendFactory {
    /// Shared HTTP client with the per-request timeout applied
    pub fn http_client(config: &TranslateConfig) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .user_agent(concat!("subgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SubgenError::Config(format!("Failed to create HTTP client: {}", e)))
    }

    pub fn create_backend(
        kind: BackendKind,
        config: &TranslateConfig,
        client: Client,
    ) -> Arc<dyn TranslationBackend> {
        match kind {
            BackendKind::Google => {
                Arc::new(google::GoogleBackend::new(client, config.google_endpoint.clone()))
            }
            BackendKind::MyMemory => Arc::new(mymemory::MyMemoryBackend::new(
                client,
                config.mymemory_endpoint.clone(),
                config.mymemory_email.clone(),
            )),
        }
    }

    /// Registry with one client per known service
    pub fn create_backends(config: &TranslateConfig) -> Result<Vec<Arc<dyn TranslationBackend>>> {
        let client = Self::http_client(config)?;

        Ok([BackendKind::Google, BackendKind::MyMemory]
            .into_iter()
            .map(|kind| Self::create_backend(kind, config, client.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_registry_contains_every_service() {
        let backends = BackendFactory::create_backends(&Config::default().translate).unwrap();
        let kinds: Vec<_> = backends.iter().map(|b| b.kind()).collect();

        assert_eq!(kinds, vec![BackendKind::Google, BackendKind::MyMemory]);
    }
}
