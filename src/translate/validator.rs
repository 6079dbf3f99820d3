use crate::config::QualityConfig;

/// Acceptance check for a single translated chunk
#[derive(Debug, Clone)]
pub struct QualityValidator {
    min_word_ratio: f64,
    max_word_ratio: f64,
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new(0.3, 3.0)
    }
}

impl QualityValidator {
    pub fn new(min_word_ratio: f64, max_word_ratio: f64) -> Self {
        Self {
            min_word_ratio,
            max_word_ratio,
        }
    }

    pub fn from_config(config: &QualityConfig) -> Self {
        Self::new(config.min_word_ratio, config.max_word_ratio)
    }

    pub fn validate(&self, original: &str, translated: &str, source_lang: &str, target_lang: &str) -> bool {
        let translated_trimmed = translated.trim();
        if translated_trimmed.is_empty() {
            return false;
        }

        // Identical output means the service echoed the input back
        if source_lang != target_lang
            && original.trim().to_lowercase() == translated_trimmed.to_lowercase()
        {
            return false;
        }

        let original_words = original.split_whitespace().count() as f64;
        let translated_words = translated.split_whitespace().count() as f64;

        translated_words >= original_words * self.min_word_ratio
            && translated_words <= original_words * self.max_word_ratio
    }
}
