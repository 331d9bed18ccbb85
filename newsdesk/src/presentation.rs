use serde::Serialize;

use crate::{
    models::{ProcessingKind, ProcessingResult, SearchResultItem},
    session::SessionState,
};

/// Render keywords as inline chips.
pub fn keyword_chips(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| {
            format!(
                r#"<span class="chip">{}</span>"#,
                escape_html(k)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Markdown block for one search hit: linked heading, description, tags.
pub fn item_markdown(item: &SearchResultItem) -> String {
    let mut block = format!("### [{}]({})\n{}", item.title, item.link, item.description);
    if !item.tags.is_empty() {
        block.push('\n');
        block.push_str(&item.tags.join(" "));
    }
    block
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationView {
    pub language: String,
    pub text: String,
}

/// What the result panel shows for the current processing result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub heading: String,
    pub body: String,
    pub translation: Option<TranslationView>,
    pub keywords: Vec<String>,
    pub keyword_chips: String,
}

impl ResultView {
    pub fn from_result(result: &ProcessingResult) -> Self {
        let heading = match result.kind {
            ProcessingKind::Summary => "Summary (500 chars)",
            ProcessingKind::Restructured => "Restructured (1000 chars)",
        };

        let translation = match (&result.translated_text, result.target_language) {
            (Some(text), Some(language)) => Some(TranslationView {
                language: language.label().to_string(),
                text: text.clone(),
            }),
            _ => None,
        };

        Self {
            heading: heading.to_string(),
            body: result.primary_text().to_string(),
            translation,
            keywords: result.keywords.clone(),
            keyword_chips: keyword_chips(&result.keywords),
        }
    }
}

/// The news / blog / related-keyword tabs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResultsView {
    pub news: Vec<String>,
    pub blog: Vec<String>,
    pub related_keywords: Vec<String>,
    pub related_chips: String,
}

impl SearchResultsView {
    pub fn from_session(session: &SessionState) -> Self {
        let render = |items: &Option<Vec<SearchResultItem>>| {
            items
                .iter()
                .flatten()
                .map(item_markdown)
                .collect::<Vec<_>>()
        };
        let related = session.related_keywords.clone().unwrap_or_default();

        Self {
            news: render(&session.news_results),
            blog: render(&session.blog_results),
            related_chips: keyword_chips(&related),
            related_keywords: related,
        }
    }
}
