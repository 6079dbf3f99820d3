use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::BackendKind;
use crate::error::{Result, SubgenError};
use crate::translate::languages::normalize_code;
use super::TranslationBackend;

const SERVICE: &str = "google";

/// Google Translate public web endpoint (`client=gtx`)
pub struct GoogleBackend {
    client: Client,
    endpoint: String,
}

impl GoogleBackend {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

/// Language code in the form the endpoint expects
fn google_code(code: &str) -> String {
    if code.eq_ignore_ascii_case("auto") {
        return "auto".to_string();
    }
    match normalize_code(code).as_str() {
        "zh" => "zh-CN".to_string(),
        other => other.to_string(),
    }
}

/// The body is `[[["translated", "original", ...], ...], ...]`, one entry per sentence
pub fn parse_google_response(body: &Value) -> Result<String> {
    let sentences = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| SubgenError::backend(SERVICE, "Unexpected response layout"))?;

    let translation: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect();

    if translation.trim().is_empty() {
        return Err(SubgenError::backend(SERVICE, "Empty translation result"));
    }

    Ok(translation)
}

#[async_trait]
impl TranslationBackend for GoogleBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Google
    }

    async fn translate_text(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let source = google_code(source_lang);
        let target = google_code(target_lang);
        debug!("Sending {} chars to {} ({} -> {})", text.chars().count(), SERVICE, source, target);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
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

        let body: Value = response
            .json()
            .await
            .map_err(|e| SubgenError::backend(SERVICE, format!("Failed to parse response: {}", e)))?;

        parse_google_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_joins_sentence_entries() {
        let body = json!([
            [
                ["Bonjour le monde. ", "Hello world. ", null, null, 10],
                ["Comment ça va ?", "How are you?", null, null, 10]
            ],
            null,
            "en"
        ]);

        assert_eq!(
            parse_google_response(&body).unwrap(),
            "Bonjour le monde. Comment ça va ?"
        );
    }

    #[test]
    fn test_parse_rejects_empty_and_malformed() {
        assert!(matches!(
            parse_google_response(&json!([[["", "Hello"]]])),
            Err(SubgenError::Backend { .. })
        ));
        assert!(matches!(
            parse_google_response(&json!({"error": "nope"})),
            Err(SubgenError::Backend { .. })
        ));
    }

    #[test]
    fn test_google_code() {
        assert_eq!(google_code("auto"), "auto");
        assert_eq!(google_code("zh"), "zh-CN");
        assert_eq!(google_code("iw"), "he");
        assert_eq!(google_code("FR"), "fr");
    }
}
