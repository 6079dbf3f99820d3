use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::config::PostProcessConfig;
use super::languages::normalize_code;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static SPACE_BEFORE_PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.!?,:;])").unwrap());

static SENTENCE_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])\s*(\p{Lu})").unwrap());

/// Cosmetic normalization of translated text
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    punctuation: HashMap<String, Vec<(String, String)>>,
}

impl PostProcessor {
    pub fn new(config: &PostProcessConfig) -> Self {
        let punctuation = config
            .languages
            .iter()
            .filter(|(_, profile)| !profile.punctuation_map.is_empty())
            .map(|(code, profile)| {
                let pairs = profile
                    .punctuation_map
                    .iter()
                    .filter(|(from, _)| !from.is_empty())
                    .map(|(from, to)| (from.clone(), to.clone()))
                    .collect();
                (normalize_code(code), pairs)
            })
            .collect();

        Self { punctuation }
    }

    pub fn process(&self, text: &str, target_lang: &str) -> String {
        let text = WHITESPACE_RUN.replace_all(text, " ");
        let text = text.trim();
        let text = SPACE_BEFORE_PUNCTUATION.replace_all(text, "${1}");
        let mut text = SENTENCE_SPACING.replace_all(&text, "${1} ${2}").into_owned();

        if let Some(pairs) = self.punctuation.get(&normalize_code(target_lang)) {
            for (from, to) in pairs {
                text = text.replace(from.as_str(), to);
            }
        }

        text
    }
}
