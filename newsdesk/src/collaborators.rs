use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    error::Result,
    models::{ContentItem, ProcessingResult, SaveOutcome, SearchResultItem, Translation},
    settings::{AiMode, Language},
};

/// Search provider client
#[async_trait]
pub trait Crawler: Send + Sync {
    async fn retrieve_news(&self, keyword: &str, count: u32) -> Result<Vec<SearchResultItem>>;

    async fn retrieve_blog_posts(&self, keyword: &str, count: u32)
    -> Result<Vec<SearchResultItem>>;

    async fn retrieve_related_keywords(&self, keyword: &str) -> Result<Vec<String>>;
}

/// AI rewrite, summary and translation service
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, content: &ContentItem, mode: AiMode) -> Result<ProcessingResult>;

    async fn translate(&self, text: &str, language: Language) -> Result<Translation>;
}

/// Note-taking destinations and clipboard formatting
#[async_trait]
pub trait Uploader: Send + Sync {
    fn format_for_clipboard(&self, text: &str) -> Result<String>;

    async fn save_local(&self, result: &ProcessingResult) -> Result<SaveOutcome>;

    async fn save_remote(&self, result: &ProcessingResult) -> Result<SaveOutcome>;
}

/// Builds collaborator handles. Construction failures are configuration errors.
pub trait CollaboratorFactory: Send + Sync {
    fn crawler(&self) -> Result<Arc<dyn Crawler>>;

    fn processor(&self) -> Result<Arc<dyn Processor>>;

    fn uploader(&self) -> Result<Arc<dyn Uploader>>;
}
