//! In-crate fake collaborators that record every call in a shared log.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::{
    collaborators::{CollaboratorFactory, Crawler, Processor, Uploader},
    error::{DeskError, Result},
    models::{
        ContentItem, ProcessingKind, ProcessingResult, SaveOutcome, SearchResultItem, Translation,
    },
    settings::{AiMode, Language},
};

pub fn item(title: &str) -> SearchResultItem {
    SearchResultItem {
        title: title.to_string(),
        link: format!("https://example.com/{}", title.replace(' ', "-")),
        description: format!("About {}", title),
        tags: vec![],
    }
}

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[derive(Clone)]
pub struct FakeCrawler {
    log: CallLog,
    news: Vec<SearchResultItem>,
    blog: Vec<SearchResultItem>,
    related: Vec<String>,
    fail_on: Option<&'static str>,
}

impl FakeCrawler {
    fn check(&self, step: &'static str) -> Result<()> {
        if self.fail_on == Some(step) {
            return Err(DeskError::Crawler(format!("{} endpoint unavailable", step)));
        }
        Ok(())
    }
}

#[async_trait]
impl Crawler for FakeCrawler {
    async fn retrieve_news(&self, keyword: &str, count: u32) -> Result<Vec<SearchResultItem>> {
        self.log.push(format!("crawler.news:{}:{}", keyword, count));
        self.check("news")?;
        Ok(self.news.clone())
    }

    async fn retrieve_blog_posts(
        &self,
        keyword: &str,
        count: u32,
    ) -> Result<Vec<SearchResultItem>> {
        self.log.push(format!("crawler.blog:{}:{}", keyword, count));
        self.check("blog")?;
        Ok(self.blog.clone())
    }

    async fn retrieve_related_keywords(&self, keyword: &str) -> Result<Vec<String>> {
        self.log.push(format!("crawler.related:{}", keyword));
        self.check("related")?;
        Ok(self.related.clone())
    }
}

#[derive(Clone)]
pub struct FakeProcessor {
    log: CallLog,
    fail_process: bool,
    fail_translate: bool,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl Processor for FakeProcessor {
    async fn process(&self, content: &ContentItem, mode: AiMode) -> Result<ProcessingResult> {
        self.log
            .push(format!("processor.process:{}:{}", content.id, mode.as_str()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_process {
            return Err(DeskError::Processor("model overloaded".to_string()));
        }

        let kind = match mode {
            AiMode::Summarize => ProcessingKind::Summary,
            AiMode::Restructure => ProcessingKind::Restructured,
        };
        Ok(ProcessingResult {
            kind,
            title: content.item.title.clone(),
            original_link: content.item.link.clone(),
            short_version: format!("short:{}", content.item.title),
            long_version: format!("long:{}", content.item.title),
            keywords: vec![format!("#{}", content.origin)],
            translated_text: None,
            target_language: None,
        })
    }

    async fn translate(&self, text: &str, language: Language) -> Result<Translation> {
        self.log
            .push(format!("processor.translate:{}:{}", language.code(), text));
        if self.fail_translate {
            return Err(DeskError::Processor("translation quota exceeded".to_string()));
        }
        Ok(Translation {
            translated_text: format!("[{}] {}", language.code(), text),
        })
    }
}

#[derive(Clone)]
pub struct FakeUploader {
    log: CallLog,
    local_outcome: SaveOutcome,
    remote_error: Option<String>,
}

#[async_trait]
impl Uploader for FakeUploader {
    fn format_for_clipboard(&self, text: &str) -> Result<String> {
        self.log.push(format!("uploader.clipboard:{}", text));
        Ok(format!("<<{}>>", text.trim()))
    }

    async fn save_local(&self, result: &ProcessingResult) -> Result<SaveOutcome> {
        self.log.push(format!("uploader.local:{}", result.title));
        Ok(self.local_outcome.clone())
    }

    async fn save_remote(&self, result: &ProcessingResult) -> Result<SaveOutcome> {
        self.log.push(format!("uploader.remote:{}", result.title));
        match &self.remote_error {
            Some(message) => Err(DeskError::Uploader(message.clone())),
            None => Ok(SaveOutcome::success("Saved to Notion", None)),
        }
    }
}

pub struct FakeFactory {
    pub log: CallLog,
    credentials: bool,
    crawler: FakeCrawler,
    processor: FakeProcessor,
    uploader: FakeUploader,
}

impl Default for FakeFactory {
    fn default() -> Self {
        let log = CallLog::default();
        Self {
            credentials: true,
            crawler: FakeCrawler {
                log: log.clone(),
                news: vec![],
                blog: vec![],
                related: vec![],
                fail_on: None,
            },
            processor: FakeProcessor {
                log: log.clone(),
                fail_process: false,
                fail_translate: false,
                gate: None,
            },
            uploader: FakeUploader {
                log: log.clone(),
                local_outcome: SaveOutcome::success(
                    "Saved to Obsidian",
                    Some("/notes/x.md".to_string()),
                ),
                remote_error: None,
            },
            log,
        }
    }
}

impl FakeFactory {
    pub fn without_credentials(mut self) -> Self {
        self.credentials = false;
        self
    }

    pub fn with_results(
        mut self,
        news: Vec<SearchResultItem>,
        blog: Vec<SearchResultItem>,
        related: Vec<&str>,
    ) -> Self {
        self.crawler.news = news;
        self.crawler.blog = blog;
        self.crawler.related = related.into_iter().map(String::from).collect();
        self
    }

    pub fn failing_crawler(mut self, step: &'static str) -> Self {
        self.crawler.fail_on = Some(step);
        self
    }

    pub fn failing_process(mut self) -> Self {
        self.processor.fail_process = true;
        self
    }

    pub fn failing_translate(mut self) -> Self {
        self.processor.fail_translate = true;
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.processor.gate = Some(gate);
        self
    }

    pub fn with_local_outcome(mut self, outcome: SaveOutcome) -> Self {
        self.uploader.local_outcome = outcome;
        self
    }

    pub fn with_remote_error(mut self, message: &str) -> Self {
        self.uploader.remote_error = Some(message.to_string());
        self
    }

    pub fn uploader_handle(&self) -> FakeUploader {
        self.uploader.clone()
    }
}

impl CollaboratorFactory for FakeFactory {
    fn crawler(&self) -> Result<Arc<dyn Crawler>> {
        self.log.push("factory.crawler");
        if !self.credentials {
            return Err(DeskError::Config(
                "NAVER_CLIENT_ID and NAVER_CLIENT_SECRET must be set".to_string(),
            ));
        }
        Ok(Arc::new(self.crawler.clone()))
    }

    fn processor(&self) -> Result<Arc<dyn Processor>> {
        self.log.push("factory.processor");
        Ok(Arc::new(self.processor.clone()))
    }

    fn uploader(&self) -> Result<Arc<dyn Uploader>> {
        self.log.push("factory.uploader");
        Ok(Arc::new(self.uploader.clone()))
    }
}
