use std::sync::Arc;
use tracing::info;

use crate::{
    collaborators::Processor,
    error::Result,
    models::{ContentItem, ProcessingResult},
    settings::{AiMode, Language, Settings},
};

/// Inputs of one processing trigger
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    pub content: ContentItem,
    pub mode: AiMode,
    pub translate_to: Option<Language>,
}

impl ProcessingRequest {
    pub fn from_settings(content: ContentItem, settings: &Settings) -> Self {
        Self {
            content,
            mode: settings.ai_mode,
            translate_to: settings.translation_target(),
        }
    }
}

/// Process the item, then translate the mode's version when a target
/// language is set. Translation never starts before processing returns.
pub async fn run_processing(
    processor: Arc<dyn Processor>,
    request: ProcessingRequest,
) -> Result<ProcessingResult> {
    info!(
        content_id = %request.content.id,
        mode = request.mode.as_str(),
        "Processing content"
    );
    let result = processor.process(&request.content, request.mode).await?;

    let Some(language) = request.translate_to else {
        return Ok(result);
    };

    info!(language = language.code(), "Translating processed content");
    let source = request.mode.translation_source(&result).to_string();
    let translation = processor.translate(&source, language).await?;

    Ok(result.with_translation(translation, language))
}
