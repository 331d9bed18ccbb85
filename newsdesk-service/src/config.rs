use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const NAVER_API_BASE: &str = "https://openapi.naver.com/v1/search";
pub const NAVER_SUGGEST_URL: &str = "https://ac.search.naver.com/nx/ac";
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_format: String,
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    pub naver_api_base: String,
    pub naver_suggest_url: String,
    pub openrouter_api_key: Option<String>,
    pub model: String,
    pub vault_path: PathBuf,
    pub notion_token: Option<String>,
    pub notion_database_id: Option<String>,
    pub notion_api_base: String,
    pub session_idle_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    /// when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Empty values count as unset.
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let vault_path = match var("OBSIDIAN_VAULT_PATH") {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .unwrap_or_default()
                .join("Documents/Obsidian/Vault"),
        };

        Ok(Self {
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            log_format: var("LOG_FORMAT").unwrap_or_else(|| "json".to_string()),
            naver_client_id: var("NAVER_CLIENT_ID"),
            naver_client_secret: var("NAVER_CLIENT_SECRET"),
            naver_api_base: var("NAVER_API_BASE").unwrap_or_else(|| NAVER_API_BASE.to_string()),
            naver_suggest_url: var("NAVER_SUGGEST_URL")
                .unwrap_or_else(|| NAVER_SUGGEST_URL.to_string()),
            openrouter_api_key: var("OPENROUTER_API_KEY"),
            model: var("NEWSDESK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            vault_path,
            notion_token: var("NOTION_TOKEN"),
            notion_database_id: var("NOTION_DATABASE_ID"),
            notion_api_base: var("NOTION_API_BASE").unwrap_or_else(|| NOTION_API_BASE.to_string()),
            session_idle_timeout: Duration::from_secs(
                var("SESSION_IDLE_MINUTES")
                    .unwrap_or_else(|| "60".to_string())
                    .parse::<u64>()
                    .context("SESSION_IDLE_MINUTES must be a valid number")?
                    * 60,
            ),
        })
    }

    /// Search-provider credentials, which the crawler cannot run without.
    pub fn naver_credentials(&self) -> Option<(&str, &str)> {
        Some((
            self.naver_client_id.as_deref()?,
            self.naver_client_secret.as_deref()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[("OBSIDIAN_VAULT_PATH", "/vault")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.naver_api_base, NAVER_API_BASE);
        assert_eq!(config.vault_path, PathBuf::from("/vault"));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(3600));
        assert!(config.naver_credentials().is_none());
    }

    #[test]
    fn credentials_require_both_values() {
        let partial = config(&[("NAVER_CLIENT_ID", "id"), ("NAVER_CLIENT_SECRET", " ")]).unwrap();
        assert!(partial.naver_credentials().is_none());

        let full = config(&[("NAVER_CLIENT_ID", "id"), ("NAVER_CLIENT_SECRET", "secret")]).unwrap();
        assert_eq!(full.naver_credentials(), Some(("id", "secret")));
    }

    #[test]
    fn idle_timeout_is_read_in_minutes() {
        let config = config(&[("SESSION_IDLE_MINUTES", "5")]).unwrap();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(300));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
