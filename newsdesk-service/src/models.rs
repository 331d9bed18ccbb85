use newsdesk::{
    ContentItem, Origin, Platform, ProcessingResult, ProgressSink, ResultView, SearchResultsView,
    SearchStage, SearchSummary, SessionState, Settings, selector,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keyword: String,
    /// Current panel values, applied before the search runs.
    #[serde(default)]
    pub settings: Option<Settings>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub content_id: String,
    #[serde(default)]
    pub settings: Option<Settings>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveRequest {
    pub platform: Platform,
}

/// One row of the content picker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: String,
    pub origin: Origin,
    pub title: String,
    pub label: String,
}

impl From<&ContentItem> for ContentEntry {
    fn from(item: &ContentItem) -> Self {
        Self {
            id: item.id.clone(),
            origin: item.origin,
            title: item.title().to_string(),
            label: item.label(),
        }
    }
}

pub fn content_entries(session: &SessionState) -> Vec<ContentEntry> {
    selector::combined_contents(session)
        .iter()
        .map(ContentEntry::from)
        .collect()
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub initialized: bool,
    pub init_error: Option<String>,
    pub settings: Settings,
    pub results: SearchResultsView,
    pub contents: Vec<ContentEntry>,
    pub processing: bool,
    pub result: Option<ResultView>,
}

impl SessionResponse {
    pub fn from_session(session: &SessionState, processing: bool) -> Self {
        Self {
            session_id: session.id.clone(),
            initialized: session.initialized,
            init_error: session.init_error.clone(),
            settings: session.settings.clone(),
            results: SearchResultsView::from_session(session),
            contents: content_entries(session),
            processing,
            result: session.ai_result.as_ref().map(ResultView::from_result),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub stage: SearchStage,
    pub percent: u8,
    pub status: String,
}

/// Collects search checkpoints so they can be returned with the response
#[derive(Debug, Default)]
pub struct ProgressLog {
    pub events: Vec<ProgressEvent>,
}

impl ProgressSink for ProgressLog {
    fn advance(&mut self, stage: SearchStage) {
        debug!(stage = ?stage, percent = stage.percent(), "Search progress");
        self.events.push(ProgressEvent {
            stage,
            percent: stage.percent(),
            status: stage.status_text().to_string(),
        });
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub message: String,
    pub summary: SearchSummary,
    pub progress: Vec<ProgressEvent>,
    pub results: SearchResultsView,
    pub contents: Vec<ContentEntry>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub result: ProcessingResult,
    pub view: ResultView,
}
