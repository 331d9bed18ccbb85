use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::models::ProcessingResult;

pub const NEWS_COUNT_RANGE: RangeInclusive<u32> = 5..=20;
pub const BLOG_COUNT_RANGE: RangeInclusive<u32> = 3..=10;
pub const DEFAULT_NEWS_COUNT: u32 = 10;
pub const DEFAULT_BLOG_COUNT: u32 = 5;

/// How the processor treats the selected item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    #[default]
    Restructure,
    Summarize,
}

impl AiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiMode::Restructure => "restructure",
            AiMode::Summarize => "summarize",
        }
    }

    /// Text handed to the translator: the long version when restructuring,
    /// the short one when summarizing.
    pub fn translation_source<'a>(&self, result: &'a ProcessingResult) -> &'a str {
        match self {
            AiMode::Restructure => &result.long_version,
            AiMode::Summarize => &result.short_version,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "ja")]
    Ja,
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "ko")]
    Ko,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Ja,
        Language::ZhCn,
        Language::ZhTw,
        Language::Ko,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
            Language::ZhCn => "zh-CN",
            Language::ZhTw => "zh-TW",
            Language::Ko => "ko",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ja => "Japanese",
            Language::ZhCn => "Chinese (Simplified)",
            Language::ZhTw => "Chinese (Traditional)",
            Language::Ko => "Korean",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unsupported language code: {}", s))
    }
}

/// Note-taking destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    LocalNotes,
    RemoteNotes,
}

impl Platform {
    pub fn label(&self) -> &'static str {
        match self {
            Platform::LocalNotes => "Obsidian",
            Platform::RemoteNotes => "Notion",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-chosen configuration captured by the settings panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub news_count: u32,
    pub blog_count: u32,
    pub ai_mode: AiMode,
    pub translation_enabled: bool,
    pub target_language: Language,
    pub save_platforms: BTreeSet<Platform>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            news_count: DEFAULT_NEWS_COUNT,
            blog_count: DEFAULT_BLOG_COUNT,
            ai_mode: AiMode::default(),
            translation_enabled: false,
            target_language: Language::default(),
            save_platforms: BTreeSet::from([Platform::LocalNotes]),
        }
    }
}

impl Settings {
    /// Pull the counts back into their slider ranges.
    pub fn clamped(mut self) -> Self {
        self.news_count = self
            .news_count
            .clamp(*NEWS_COUNT_RANGE.start(), *NEWS_COUNT_RANGE.end());
        self.blog_count = self
            .blog_count
            .clamp(*BLOG_COUNT_RANGE.start(), *BLOG_COUNT_RANGE.end());
        self
    }

    /// Target language when translation is switched on.
    pub fn translation_target(&self) -> Option<Language> {
        self.translation_enabled.then_some(self.target_language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_panel() {
        let settings = Settings::default();
        assert_eq!(settings.news_count, 10);
        assert_eq!(settings.blog_count, 5);
        assert_eq!(settings.ai_mode, AiMode::Restructure);
        assert!(!settings.translation_enabled);
        assert_eq!(
            settings.save_platforms.iter().collect::<Vec<_>>(),
            vec![&Platform::LocalNotes]
        );
        assert_eq!(settings.translation_target(), None);
    }

    #[test]
    fn counts_are_clamped() {
        let settings = Settings {
            news_count: 50,
            blog_count: 1,
            ..Settings::default()
        }
        .clamped();

        assert_eq!(settings.news_count, 20);
        assert_eq!(settings.blog_count, 3);
    }

    #[test]
    fn language_codes_round_trip_through_serde() {
        assert_eq!(serde_json::to_string(&Language::ZhTw).unwrap(), "\"zh-TW\"");
        assert_eq!("zh-cn".parse::<Language>().unwrap(), Language::ZhCn);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let json = r#"{"ai_mode":"summarize","translation_enabled":true,"target_language":"ja"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.ai_mode, AiMode::Summarize);
        assert_eq!(settings.translation_target(), Some(Language::Ja));
        assert_eq!(settings.news_count, DEFAULT_NEWS_COUNT);
    }
}
