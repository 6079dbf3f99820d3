use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::BackendKind;
use crate::error::{Result, SubgenError};
use crate::translate::languages::normalize_code;
use super::TranslationBackend;

const SERVICE: &str = "mymemory";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyMemoryResponse {
    pub response_data: Option<MyMemoryData>,
    /// Integer on success, sometimes a string on errors
    pub response_status: Value,
    #[serde(default)]
    pub response_details: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyMemoryData {
    pub translated_text: Option<String>,
}

/// MyMemory translation memory API (`/get?q=..&langpair=src|tgt`)
pub struct MyMemoryBackend {
    client: Client,
    endpoint: String,
    email: Option<String>,
}

impl MyMemoryBackend {
    pub fn new(client: Client, endpoint: String, email: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            email,
        }
    }
}

fn language_pair(source_lang: &str, target_lang: &str) -> String {
    let source = if source_lang.eq_ignore_ascii_case("auto") {
        "Autodetect".to_string()
    } else {
        normalize_code(source_lang)
    };
    format!("{}|{}", source, normalize_code(target_lang))
}

fn status_code(status: &Value) -> Option<u64> {
    match status {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn parse_mymemory_response(response: MyMemoryResponse) -> Result<String> {
    let status = status_code(&response.response_status);
    if status != Some(200) {
        return Err(SubgenError::backend(
            SERVICE,
            format!("API error {:?}: {}", status, response.response_details),
        ));
    }

    let translation = response
        .response_data
        .and_then(|data| data.translated_text)
        .unwrap_or_default();

    if translation.trim().is_empty() {
        return Err(SubgenError::backend(SERVICE, "Empty translation result"));
    }

    Ok(translation)
}

#[async_trait]
impl TranslationBackend for MyMemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::MyMemory
    }

    async fn translate_text(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let langpair = language_pair(source_lang, target_lang);
        debug!("Sending {} chars to {} ({})", text.chars().count(), SERVICE, langpair);

        let mut query = vec![("q", text.to_string()), ("langpair", langpair)];
        if let Some(email) = &self.email {
            query.push(("de", email.clone()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| SubgenError::backend(SERVICE, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubgenError::backend(
                SERVICE,
                format!("API error {}: {}", status, error_text.trim()),
            ));
        }

        let parsed: MyMemoryResponse = response
            .json()
            .await
            .map_err(|e| SubgenError::backend(SERVICE, format!("Failed to parse response: {}", e)))?;

        parse_mymemory_response(parsed)
    }
}
