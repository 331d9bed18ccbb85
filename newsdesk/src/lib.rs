pub mod collaborators;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod models;
pub mod presentation;
pub mod processing;
pub mod search;
pub mod selector;
pub mod session;
pub mod settings;

#[cfg(any(test, feature = "test-util"))]
pub mod fakes;

// Re-export commonly used types
pub use collaborators::{CollaboratorFactory, Crawler, Processor, Uploader};
pub use dashboard::Dashboard;
pub use error::{DeskError, Result};
pub use export::{CopyReport, SaveReport};
pub use models::{
    ContentItem, Origin, ProcessingKind, ProcessingResult, SaveOutcome, SaveStatus,
    SearchResultItem, Translation,
};
pub use presentation::{ResultView, SearchResultsView};
pub use search::{ProgressSink, SearchStage, SearchSummary};
pub use session::{InMemorySessionStorage, SessionState, SessionStorage};
pub use settings::{AiMode, Language, Platform, Settings};
