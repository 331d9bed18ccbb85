use thiserror::Error;

/// Errors raised by the dashboard orchestrations and their collaborators
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("Search failed: {0}")]
    Crawler(String),

    #[error("Processing failed: {0}")]
    Processor(String),

    #[error("Upload failed: {0}")]
    Uploader(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Content not found: {0}")]
    ContentNotFound(String),

    #[error("No processing result available")]
    NoResult,

    #[error("Processing already in progress for session {0}")]
    Busy(String),
}

impl DeskError {
    /// Whether the error text points at a platform credential problem.
    pub fn mentions_api(&self) -> bool {
        self.to_string().contains("API")
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
