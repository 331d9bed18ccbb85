use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use newsdesk::{DeskError, ProcessingResult, SaveOutcome, Uploader};
use regex::Regex;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{error, info};

use super::llm::truncate_chars;

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank-line pattern"));

const NOTION_VERSION: &str = "2022-06-28";
const NOTION_TEXT_LIMIT: usize = 2000;
const FILE_TITLE_LIMIT: usize = 50;

/// Remote workspace credentials
#[derive(Debug, Clone)]
pub struct NotionTarget {
    pub token: String,
    pub database_id: String,
}

/// Uploader writing markdown notes into a local vault or pages into a
/// remote Notion database
#[derive(Clone)]
pub struct NotesUploader {
    client: reqwest::Client,
    vault_path: PathBuf,
    notion: Option<NotionTarget>,
    notion_api_base: String,
}

impl NotesUploader {
    pub fn new(
        vault_path: impl Into<PathBuf>,
        notion: Option<NotionTarget>,
        notion_api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            vault_path: vault_path.into(),
            notion,
            notion_api_base: notion_api_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn write_note(&self, result: &ProcessingResult) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.vault_path)
            .await
            .with_context(|| format!("Cannot create vault at {}", self.vault_path.display()))?;

        let now = Local::now();
        let path = self.vault_path.join(note_file_name(&result.title, now));
        tokio::fs::write(&path, render_note(result, now))
            .await
            .with_context(|| format!("Cannot write {}", path.display()))?;
        Ok(path)
    }

    async fn create_page(
        &self,
        target: &NotionTarget,
        result: &ProcessingResult,
    ) -> anyhow::Result<Value> {
        let url = format!("{}/pages", self.notion_api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&target.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&page_body(&target.database_id, result, Local::now()))
            .send()
            .await
            .context("Notion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Notion API returned {}: {}", status, body));
        }
        response.json().await.context("Invalid Notion response")
    }
}

/// Normalize line endings, strip trailing spaces and squeeze blank runs.
pub fn format_clipboard_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed_lines = unified
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_RUNS
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}

fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    truncate_chars(&cleaned, FILE_TITLE_LIMIT)
}

fn note_file_name(title: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.md", now.format("%Y%m%d_%H%M%S"), sanitize_title(title))
}

fn render_note(result: &ProcessingResult, now: DateTime<Local>) -> String {
    let tags = result
        .keywords
        .iter()
        .map(|k| format!("\"{}\"", k.trim_start_matches('#')))
        .collect::<Vec<_>>()
        .join(", ");

    let mut note = format!(
        "---\ntitle: \"{}\"\nsource: \"{}\"\ndate: {}\ntags: [{}]\n---\n\n",
        result.title.replace('"', "'"),
        result.original_link,
        now.format("%Y-%m-%d %H:%M:%S"),
        tags
    );
    note.push_str(&format!("# {}\n\n", result.title));
    note.push_str(&format!("Source: [{}]({})\n\n", result.title, result.original_link));
    note.push_str(result.primary_text());
    note.push_str("\n\n");

    if let (Some(text), Some(language)) = (&result.translated_text, result.target_language) {
        note.push_str(&format!("## Translation ({})\n\n{}\n\n", language.label(), text));
    }
    if !result.keywords.is_empty() {
        note.push_str(&format!("Keywords: {}\n", result.keywords.join(" ")));
    }
    note
}

fn page_body(database_id: &str, result: &ProcessingResult, now: DateTime<Local>) -> Value {
    let tags: Vec<Value> = result
        .keywords
        .iter()
        .map(|k| json!({ "name": k.trim_start_matches('#') }))
        .collect();

    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "제목": { "title": [{ "text": { "content": result.title } }] },
            "출처": { "url": result.original_link },
            "태그": { "multi_select": tags },
            "작성일": { "date": { "start": now.format("%Y-%m-%d").to_string() } }
        },
        "children": [{
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": truncate_chars(result.primary_text(), NOTION_TEXT_LIMIT) }
                }]
            }
        }]
    })
}

fn uploader_error(e: anyhow::Error) -> DeskError {
    error!("Note upload failed: {:#}", e);
    DeskError::Uploader(format!("{:#}", e))
}

#[async_trait]
impl Uploader for NotesUploader {
    fn format_for_clipboard(&self, text: &str) -> newsdesk::Result<String> {
        Ok(format_clipboard_text(text))
    }

    async fn save_local(&self, result: &ProcessingResult) -> newsdesk::Result<SaveOutcome> {
        let path = self.write_note(result).await.map_err(uploader_error)?;
        info!(path = %path.display(), "Note saved to vault");
        Ok(SaveOutcome::success(
            "Saved to Obsidian",
            Some(path.display().to_string()),
        ))
    }

    async fn save_remote(&self, result: &ProcessingResult) -> newsdesk::Result<SaveOutcome> {
        let Some(target) = &self.notion else {
            return Err(DeskError::Uploader(
                "Notion API settings are required".to_string(),
            ));
        };

        let page = self.create_page(target, result).await.map_err(uploader_error)?;
        let page_url = page.get("url").and_then(Value::as_str).map(String::from);
        info!(page_url = ?page_url, "Note saved to Notion");
        Ok(SaveOutcome::success("Saved to Notion", page_url))
    }
}
