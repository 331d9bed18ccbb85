use serde::Serialize;
use tracing::{error, info};

use crate::{
    collaborators::Uploader,
    error::Result,
    models::{ProcessingResult, SaveStatus},
    settings::Platform,
};

pub const COPY_HINT: &str = "Select the text above and copy it (Ctrl+A, Ctrl+C)";
pub const REMOTE_HINT: &str = "Check your remote notes workspace.";
pub const SAVE_FAILED: &str = "Saving failed.";

/// Clipboard-ready text plus the manual-copy hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyReport {
    pub text: String,
    pub hint: String,
}

/// Format the result's primary text for manual copying.
pub fn copy_text(uploader: &dyn Uploader, result: &ProcessingResult) -> Result<CopyReport> {
    let text = uploader.format_for_clipboard(result.primary_text())?;
    Ok(CopyReport {
        text,
        hint: COPY_HINT.to_string(),
    })
}

/// What the save panel displays after one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub platform: Platform,
    pub success: bool,
    pub message: String,
    pub detail: Option<String>,
    pub hint: Option<String>,
}

/// Dispatch the result to one platform. Errors are folded into the report.
pub async fn save_result(
    uploader: &dyn Uploader,
    platform: Platform,
    result: &ProcessingResult,
) -> SaveReport {
    info!(platform = platform.label(), title = %result.title, "Saving result");

    let outcome = match platform {
        Platform::LocalNotes => uploader.save_local(result).await,
        Platform::RemoteNotes => uploader.save_remote(result).await,
    };

    match outcome {
        Ok(outcome) if outcome.status == SaveStatus::Success => {
            let detail = match platform {
                Platform::LocalNotes => outcome.path.map(|path| format!("Saved to: {}", path)),
                Platform::RemoteNotes => Some(REMOTE_HINT.to_string()),
            };
            SaveReport {
                platform,
                success: true,
                message: outcome.message,
                detail,
                hint: None,
            }
        }
        Ok(outcome) => {
            error!(platform = platform.label(), message = %outcome.message, "Save reported failure");
            SaveReport {
                platform,
                success: false,
                message: SAVE_FAILED.to_string(),
                detail: None,
                hint: None,
            }
        }
        Err(e) => {
            error!(platform = platform.label(), error = %e, "Save failed");
            SaveReport {
                platform,
                success: false,
                message: format!("An error occurred while saving: {}", e),
                detail: None,
                hint: e
                    .mentions_api()
                    .then(|| format!("Check the {} API settings.", platform.label())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeFactory;
    use crate::models::{ProcessingKind, SaveOutcome};

    fn result(kind: ProcessingKind) -> ProcessingResult {
        ProcessingResult {
            kind,
            title: "x".to_string(),
            original_link: "https://example.com/x".to_string(),
            short_version: " short ".to_string(),
            long_version: "long".to_string(),
            keywords: vec![],
            translated_text: None,
            target_language: None,
        }
    }

    #[test]
    fn copy_uses_version_matching_kind() {
        let factory = FakeFactory::default();
        let uploader = factory.uploader_handle();

        let summary = copy_text(&uploader, &result(ProcessingKind::Summary)).unwrap();
        assert_eq!(summary.text, uploader.format_for_clipboard(" short ").unwrap());

        let restructured = copy_text(&uploader, &result(ProcessingKind::Restructured)).unwrap();
        assert_eq!(restructured.text, uploader.format_for_clipboard("long").unwrap());
        assert_eq!(restructured.hint, COPY_HINT);
    }

    #[tokio::test]
    async fn local_save_shows_path() {
        let factory = FakeFactory::default();
        let report = save_result(
            &factory.uploader_handle(),
            Platform::LocalNotes,
            &result(ProcessingKind::Summary),
        )
        .await;

        assert!(report.success);
        assert_eq!(report.message, "Saved to Obsidian");
        assert_eq!(report.detail.as_deref(), Some("Saved to: /notes/x.md"));
        assert_eq!(factory.log.count("uploader.remote"), 0);
    }

    #[tokio::test]
    async fn remote_save_success_points_to_workspace() {
        let factory = FakeFactory::default();
        let report = save_result(
            &factory.uploader_handle(),
            Platform::RemoteNotes,
            &result(ProcessingKind::Summary),
        )
        .await;

        assert!(report.success);
        assert_eq!(report.detail.as_deref(), Some(REMOTE_HINT));
        assert_eq!(factory.log.count("uploader.local"), 0);
    }

    #[tokio::test]
    async fn api_errors_add_credential_hint() {
        let factory = FakeFactory::default().with_remote_error("Notion API settings are required");
        let report = save_result(
            &factory.uploader_handle(),
            Platform::RemoteNotes,
            &result(ProcessingKind::Restructured),
        )
        .await;

        assert!(!report.success);
        assert!(report.message.contains("Notion API settings are required"));
        assert_eq!(report.hint.as_deref(), Some("Check the Notion API settings."));
    }

    #[tokio::test]
    async fn other_errors_have_no_hint() {
        let factory = FakeFactory::default().with_remote_error("disk full");
        let report = save_result(
            &factory.uploader_handle(),
            Platform::RemoteNotes,
            &result(ProcessingKind::Restructured),
        )
        .await;

        assert!(!report.success);
        assert!(report.hint.is_none());
    }

    #[tokio::test]
    async fn failure_status_shows_generic_banner() {
        let factory =
            FakeFactory::default().with_local_outcome(SaveOutcome::failure("vault locked"));
        let report = save_result(
            &factory.uploader_handle(),
            Platform::LocalNotes,
            &result(ProcessingKind::Summary),
        )
        .await;

        assert!(!report.success);
        assert_eq!(report.message, SAVE_FAILED);
    }
}
