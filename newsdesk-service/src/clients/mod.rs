pub mod llm;
pub mod naver;
pub mod notes;

use newsdesk::{CollaboratorFactory, Crawler, DeskError, Processor, Uploader};
use std::sync::Arc;

use crate::config::Config;

pub use llm::LlmProcessor;
pub use naver::NaverCrawler;
pub use notes::{NotesUploader, NotionTarget};

/// Builds the production collaborators from service configuration
pub struct LiveCollaborators {
    config: Config,
}

impl LiveCollaborators {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl CollaboratorFactory for LiveCollaborators {
    fn crawler(&self) -> newsdesk::Result<Arc<dyn Crawler>> {
        let (client_id, client_secret) = self.config.naver_credentials().ok_or_else(|| {
            DeskError::Config("NAVER_CLIENT_ID and NAVER_CLIENT_SECRET must be set".to_string())
        })?;

        Ok(Arc::new(NaverCrawler::new(
            client_id,
            client_secret,
            self.config.naver_api_base.as_str(),
            self.config.naver_suggest_url.as_str(),
        )))
    }

    fn processor(&self) -> newsdesk::Result<Arc<dyn Processor>> {
        let api_key = self
            .config
            .openrouter_api_key
            .as_deref()
            .ok_or_else(|| DeskError::Config("OPENROUTER_API_KEY must be set".to_string()))?;

        Ok(Arc::new(LlmProcessor::new(api_key, self.config.model.as_str())))
    }

    fn uploader(&self) -> newsdesk::Result<Arc<dyn Uploader>> {
        let notion = match (&self.config.notion_token, &self.config.notion_database_id) {
            (Some(token), Some(database_id)) => Some(NotionTarget {
                token: token.clone(),
                database_id: database_id.clone(),
            }),
            _ => None,
        };

        Ok(Arc::new(NotesUploader::new(
            self.config.vault_path.clone(),
            notion,
            self.config.notion_api_base.as_str(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn crawler_requires_search_secrets() {
        let factory = LiveCollaborators::new(config(&[]));
        let err = factory.crawler().err().unwrap();
        assert!(matches!(err, DeskError::Config(_)));
        assert!(err.to_string().contains("NAVER_CLIENT_ID"));
    }

    #[test]
    fn processor_requires_llm_key() {
        let factory = LiveCollaborators::new(config(&[]));
        assert!(matches!(factory.processor().err(), Some(DeskError::Config(_))));

        let factory = LiveCollaborators::new(config(&[("OPENROUTER_API_KEY", "key")]));
        assert!(factory.processor().is_ok());
    }

    #[test]
    fn uploader_builds_without_remote_settings() {
        let factory = LiveCollaborators::new(config(&[("NAVER_CLIENT_ID", "id")]));
        assert!(factory.uploader().is_ok());
    }
}
