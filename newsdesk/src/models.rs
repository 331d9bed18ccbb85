use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::Language;

/// A single hit returned by the search provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Which result list a content item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    News,
    Blog,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::News => "news",
            Origin::Blog => "blog",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search result tagged with its origin and a selection identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub origin: Origin,
    #[serde(flatten)]
    pub item: SearchResultItem,
}

impl ContentItem {
    pub fn title(&self) -> &str {
        &self.item.title
    }

    /// Label shown in the selection list, e.g. `[news] Some headline`.
    pub fn label(&self) -> String {
        format!("[{}] {}", self.origin, self.item.title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingKind {
    Summary,
    Restructured,
}

/// Output of one AI pass over a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    #[serde(rename = "type")]
    pub kind: ProcessingKind,
    pub title: String,
    pub original_link: String,
    pub short_version: String,
    pub long_version: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<Language>,
}

impl ProcessingResult {
    /// The version matching the result kind: short for summaries, long otherwise.
    pub fn primary_text(&self) -> &str {
        match self.kind {
            ProcessingKind::Summary => &self.short_version,
            ProcessingKind::Restructured => &self.long_version,
        }
    }

    pub fn with_translation(mut self, translation: Translation, language: Language) -> Self {
        self.translated_text = Some(translation.translated_text);
        self.target_language = Some(language);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub translated_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Success,
    Failure,
}

/// What the uploader reports for one save attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub status: SaveStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl SaveOutcome {
    pub fn success(message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            status: SaveStatus::Success,
            message: message.into(),
            path,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: SaveStatus::Failure,
            message: message.into(),
            path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_result_uses_type_field() {
        let result = ProcessingResult {
            kind: ProcessingKind::Summary,
            title: "t".to_string(),
            original_link: "https://example.com".to_string(),
            short_version: "short".to_string(),
            long_version: "long".to_string(),
            keywords: vec!["#a".to_string()],
            translated_text: None,
            target_language: None,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "summary");
        assert!(value.get("translated_text").is_none());
        assert_eq!(result.primary_text(), "short");
    }

    #[test]
    fn content_item_label_includes_origin() {
        let item = ContentItem {
            id: "1:blog:0".to_string(),
            origin: Origin::Blog,
            item: SearchResultItem {
                title: "Rust weekly".to_string(),
                link: "https://blog.example.com/1".to_string(),
                description: String::new(),
                tags: vec![],
            },
        };

        assert_eq!(item.label(), "[blog] Rust weekly");
    }
}
