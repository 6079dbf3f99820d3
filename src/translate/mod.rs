// Text translation pipeline
//
// The orchestrator splits the text into chunks, sends each chunk through the configured
// services in order until one result passes the quality check, and post-processes the
// output. The realigner maps the translated text back onto the original timed segments.

pub mod backend;
pub mod languages;
pub mod orchestrator;
pub mod postprocess;
pub mod realign;
pub mod settings;
pub mod splitter;
pub mod validator;

pub use backend::{BackendFactory, TranslationBackend};
pub use orchestrator::TranslationOrchestrator;
pub use postprocess::PostProcessor;
pub use realign::realign;
pub use settings::TranslationSettings;
pub use splitter::split_text;
pub use validator::QualityValidator;

use crate::config::BackendKind;

/// One chunk as sent to a service; `source_lang` may be "auto"
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// A service answer that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub text: String,
    pub service: BackendKind,
}
