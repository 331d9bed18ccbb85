use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    collaborators::{CollaboratorFactory, Crawler, Uploader},
    error::Result,
    models::{ProcessingResult, SearchResultItem},
    settings::Settings,
};

/// Everything one dashboard session remembers between interactions
#[derive(Clone)]
pub struct SessionState {
    pub id: String,
    pub initialized: bool,
    pub init_error: Option<String>,
    pub crawler: Option<Arc<dyn Crawler>>,
    pub uploader: Option<Arc<dyn Uploader>>,
    pub settings: Settings,
    pub news_results: Option<Vec<SearchResultItem>>,
    pub blog_results: Option<Vec<SearchResultItem>>,
    pub related_keywords: Option<Vec<String>>,
    /// Bumped on every committed search; part of every content identifier.
    pub generation: u64,
    pub ai_result: Option<ProcessingResult>,
}

impl SessionState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initialized: false,
            init_error: None,
            crawler: None,
            uploader: None,
            settings: Settings::default(),
            news_results: None,
            blog_results: None,
            related_keywords: None,
            generation: 0,
            ai_result: None,
        }
    }

    /// Build the crawler and uploader once. A failure is recorded on the
    /// session and leaves both handles empty.
    pub fn initialize(&mut self, factory: &dyn CollaboratorFactory) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let handles = factory
            .crawler()
            .and_then(|crawler| Ok((crawler, factory.uploader()?)));

        match handles {
            Ok((crawler, uploader)) => {
                info!(session_id = %self.id, "Session collaborators initialized");
                self.crawler = Some(crawler);
                self.uploader = Some(uploader);
                self.init_error = None;
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Session initialization failed");
                self.crawler = None;
                self.uploader = None;
                self.init_error = Some(e.to_string());
            }
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("id", &self.id)
            .field("initialized", &self.initialized)
            .field("init_error", &self.init_error)
            .field("has_crawler", &self.crawler.is_some())
            .field("has_uploader", &self.uploader.is_some())
            .field("settings", &self.settings)
            .field("generation", &self.generation)
            .field("has_ai_result", &self.ai_result.is_some())
            .finish_non_exhaustive()
    }
}

/// Trait for storing and retrieving sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: SessionState) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<SessionState>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of SessionStorage
#[derive(Default)]
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, SessionState>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: SessionState) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SessionState>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeFactory;

    #[tokio::test]
    async fn storage_round_trip() {
        let storage = InMemorySessionStorage::new();
        let mut session = SessionState::new("session1");
        session.related_keywords = Some(vec!["#rust".to_string()]);

        storage.save(session).await.unwrap();
        let loaded = storage.get("session1").await.unwrap().unwrap();
        assert_eq!(loaded.related_keywords, Some(vec!["#rust".to_string()]));

        storage.delete("session1").await.unwrap();
        assert!(storage.get("session1").await.unwrap().is_none());
    }

    #[test]
    fn initialize_records_config_error() {
        let factory = FakeFactory::default().without_credentials();
        let mut session = SessionState::new("s");

        session.initialize(&factory);

        assert!(session.initialized);
        assert!(session.crawler.is_none());
        assert!(session.uploader.is_none());
        assert!(session.init_error.unwrap().contains("Configuration error"));
    }

    #[test]
    fn initialize_runs_once() {
        let factory = FakeFactory::default();
        let mut session = SessionState::new("s");

        session.initialize(&factory);
        session.initialize(&factory);

        assert!(session.crawler.is_some());
        assert_eq!(factory.log.count("factory.crawler"), 1);
    }
}
