use anyhow::Context;
use async_trait::async_trait;
use newsdesk::{
    AiMode, ContentItem, DeskError, Language, ProcessingKind, ProcessingResult, Processor,
    Translation,
};
use rig::{agent::Agent, client::CompletionClient, completion::Prompt, providers::openrouter};
use tracing::{error, info};

const LONG_TARGET: usize = 1000;
const SHORT_TARGET: usize = 450;
const SHORT_LIMIT: usize = 500;
const MAX_KEYWORDS: usize = 10;

/// Processor that prompts an OpenRouter-hosted model
pub struct LlmProcessor {
    client: openrouter::Client,
    model: String,
}

impl LlmProcessor {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openrouter::Client::new(api_key),
            model: model.into(),
        }
    }

    fn agent(
        &self,
        preamble: &str,
        temperature: f64,
        max_tokens: u64,
    ) -> Agent<openrouter::CompletionModel> {
        self.client
            .agent(&self.model)
            .preamble(preamble)
            .temperature(temperature)
            .max_tokens(max_tokens)
            .build()
    }

    async fn complete(
        &self,
        preamble: &str,
        input: &str,
        temperature: f64,
        max_tokens: u64,
    ) -> anyhow::Result<String> {
        let response = self
            .agent(preamble, temperature, max_tokens)
            .prompt(input)
            .await
            .context("LLM request failed")?;
        Ok(response.trim().to_string())
    }

    async fn summarize(&self, text: &str, target_length: usize) -> anyhow::Result<String> {
        self.complete(&summary_preamble(target_length), text, 0.7, 1500)
            .await
            .with_context(|| format!("Summary ({} chars) failed", target_length))
    }

    async fn restructure(&self, text: &str) -> anyhow::Result<String> {
        let preamble = r#"Rewrite the following content with a new structure.
Follow these rules:
1. Organize it logically
2. Focus on objective facts
3. Emphasize the key message
4. Explain technical terms simply
5. Split it into readable paragraphs
Answer in the language of the content."#;

        self.complete(preamble, text, 0.7, 2000)
            .await
            .context("Restructuring failed")
    }

    /// Keyword extraction never fails the pass; an error yields no keywords.
    async fn extract_keywords(&self, text: &str) -> Vec<String> {
        let preamble = "Extract the main keywords from the following content and return them \
                        as hashtags separated by spaces (at most 10).";

        match self.complete(preamble, text, 0.5, 200).await {
            Ok(response) => parse_keywords(&response),
            Err(e) => {
                error!("Keyword extraction failed: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn run(&self, content: &ContentItem, mode: AiMode) -> anyhow::Result<ProcessingResult> {
        let description = content.item.description.trim();
        if description.is_empty() {
            anyhow::bail!("Content has no description to process");
        }

        let result = match mode {
            AiMode::Summarize => {
                let long_version = self.summarize(description, LONG_TARGET).await?;
                let short_version = self.summarize(description, SHORT_TARGET).await?;
                ProcessingResult {
                    kind: ProcessingKind::Summary,
                    title: content.item.title.clone(),
                    original_link: content.item.link.clone(),
                    short_version,
                    long_version,
                    keywords: self.extract_keywords(description).await,
                    translated_text: None,
                    target_language: None,
                }
            }
            AiMode::Restructure => {
                let restructured = self.restructure(description).await?;
                ProcessingResult {
                    kind: ProcessingKind::Restructured,
                    title: content.item.title.clone(),
                    original_link: content.item.link.clone(),
                    short_version: truncate_chars(&restructured, SHORT_LIMIT),
                    keywords: self.extract_keywords(&restructured).await,
                    long_version: restructured,
                    translated_text: None,
                    target_language: None,
                }
            }
        };
        Ok(result)
    }
}

fn summary_preamble(target_length: usize) -> String {
    format!(
        r#"Summarize the following content in about {} characters.
Follow these rules:
1. State the core message first
2. Keep important figures and statistics
3. Explain technical terms as simply as possible
4. Keep sentences concise
Answer in the language of the content."#,
        target_length
    )
}

fn translation_preamble(language: Language) -> String {
    format!(
        "Translate the following text into {} ({}). Preserve paragraphs and hashtags. \
         Return only the translation.",
        language.label(),
        language.code()
    )
}

/// Hashtag tokens from a model response, at most ten.
pub fn parse_keywords(response: &str) -> Vec<String> {
    response
        .split_whitespace()
        .map(|token| token.trim_end_matches([',', '.']))
        .filter(|token| token.starts_with('#') && token.len() > 1)
        .take(MAX_KEYWORDS)
        .map(String::from)
        .collect()
}

/// Cut `text` to at most `limit` characters without splitting a character.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((index, _)) => text[..index].trim_end().to_string(),
        None => text.to_string(),
    }
}

#[async_trait]
impl Processor for LlmProcessor {
    async fn process(
        &self,
        content: &ContentItem,
        mode: AiMode,
    ) -> newsdesk::Result<ProcessingResult> {
        info!(title = %content.item.title, mode = mode.as_str(), "Running AI pass");
        self.run(content, mode).await.map_err(|e| {
            error!("Content processing failed: {:#}", e);
            DeskError::Processor(format!("{:#}", e))
        })
    }

    async fn translate(&self, text: &str, language: Language) -> newsdesk::Result<Translation> {
        info!(language = language.code(), "Translating content");
        let translated_text = self
            .complete(&translation_preamble(language), text, 0.3, 2000)
            .await
            .map_err(|e| DeskError::Processor(format!("Translation failed: {:#}", e)))?;
        Ok(Translation { translated_text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_keep_hashtags_only() {
        let keywords = parse_keywords("Keywords: #반도체, #수출 growth #AI.\n#");
        assert_eq!(keywords, vec!["#반도체", "#수출", "#AI"]);
    }

    #[test]
    fn keywords_are_capped() {
        let response = (0..15).map(|i| format!("#k{}", i)).collect::<Vec<_>>().join(" ");
        assert_eq!(parse_keywords(&response).len(), 10);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("가나다라", 2), "가나");
        assert_eq!(truncate_chars("short", 500), "short");
    }

    #[test]
    fn preambles_carry_targets() {
        assert!(summary_preamble(450).contains("about 450 characters"));
        assert!(translation_preamble(Language::ZhTw).contains("Chinese (Traditional) (zh-TW)"));
    }
}
