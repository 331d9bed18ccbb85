//! Dashboard – session-scoped entry point for every user trigger.
//!
//! Each operation follows the same _load → run → save_ cycle against a
//! [`SessionStorage`]: the session is fetched by id, one orchestration runs
//! against it, and the updated state is written back for the next render.
//!
//! AI processing is the one operation that does not run inline. A trigger
//! spawns a single tokio task that runs the processing pair and commits the
//! result; the session is marked busy until that task settles, and further
//! triggers are rejected with [`DeskError::Busy`] in the meantime.
//!
//! Every access stamps the session as seen; [`Dashboard::evict_idle`] drops
//! sessions nobody has touched for a while.

use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::{
    collaborators::{CollaboratorFactory, Uploader},
    error::{DeskError, Result},
    export::{self, CopyReport, SaveReport},
    models::{ContentItem, ProcessingResult},
    presentation::ResultView,
    processing::{self, ProcessingRequest},
    search::{self, ProgressSink, SearchSummary},
    selector,
    session::{SessionState, SessionStorage},
    settings::{Platform, Settings},
};

#[derive(Clone)]
pub struct Dashboard {
    storage: Arc<dyn SessionStorage>,
    factory: Arc<dyn CollaboratorFactory>,
    in_flight: Arc<DashSet<String>>,
    last_seen: Arc<DashMap<String, Instant>>,
}

impl Dashboard {
    pub fn new(storage: Arc<dyn SessionStorage>, factory: Arc<dyn CollaboratorFactory>) -> Self {
        Self {
            storage,
            factory,
            in_flight: Arc::new(DashSet::new()),
            last_seen: Arc::new(DashMap::new()),
        }
    }

    /// Return the session, creating and initializing it on first use.
    pub async fn open_session(&self, session_id: &str) -> Result<SessionState> {
        if let Some(session) = self.storage.get(session_id).await? {
            self.touch(session_id);
            return Ok(session);
        }

        info!(session_id, "Opening new session");
        let mut session = SessionState::new(session_id);
        session.initialize(self.factory.as_ref());
        self.storage.save(session.clone()).await?;
        self.touch(session_id);
        Ok(session)
    }

    pub async fn session(&self, session_id: &str) -> Result<SessionState> {
        let session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| DeskError::SessionNotFound(session_id.to_string()))?;
        self.touch(session_id);
        Ok(session)
    }

    pub async fn close_session(&self, session_id: &str) -> Result<()> {
        self.session(session_id).await?;
        info!(session_id, "Closing session");
        self.last_seen.remove(session_id);
        self.storage.delete(session_id).await
    }

    /// Delete sessions unused for at least `max_idle`. Sessions with a
    /// processing task in flight are kept. Returns the evicted ids.
    pub async fn evict_idle(&self, max_idle: Duration) -> Result<Vec<String>> {
        let idle: Vec<String> = self
            .last_seen
            .iter()
            .filter(|entry| entry.value().elapsed() >= max_idle)
            .map(|entry| entry.key().clone())
            .filter(|id| !self.in_flight.contains(id))
            .collect();

        for session_id in &idle {
            self.last_seen.remove(session_id);
            self.storage.delete(session_id).await?;
        }
        if !idle.is_empty() {
            info!(evicted = idle.len(), "Evicted idle sessions");
        }
        Ok(idle)
    }

    fn touch(&self, session_id: &str) {
        self.last_seen.insert(session_id.to_string(), Instant::now());
    }

    pub async fn apply_settings(&self, session_id: &str, settings: Settings) -> Result<Settings> {
        let mut session = self.session(session_id).await?;
        session.settings = settings.clamped();
        let applied = session.settings.clone();
        self.storage.save(session).await?;
        Ok(applied)
    }

    pub async fn search(
        &self,
        session_id: &str,
        keyword: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<SearchSummary> {
        let mut searched = self.session(session_id).await?;
        let outcome =
            search::run_search(&mut searched, self.factory.as_ref(), keyword, progress).await;

        // Write onto the latest stored state; a processing result may have
        // been committed while the search was running. The crawler handle
        // may have been rebuilt even when the search failed.
        let mut session = self.session(session_id).await?;
        session.crawler = searched.crawler;
        if outcome.is_ok() {
            session.news_results = searched.news_results;
            session.blog_results = searched.blog_results;
            session.related_keywords = searched.related_keywords;
            session.generation += 1;
        }
        self.storage.save(session).await?;
        outcome
    }

    pub async fn contents(&self, session_id: &str) -> Result<Vec<ContentItem>> {
        let session = self.session(session_id).await?;
        Ok(selector::combined_contents(&session))
    }

    pub fn is_processing(&self, session_id: &str) -> bool {
        self.in_flight.contains(session_id)
    }

    /// Run the processing pair for the selected item on a spawned task and
    /// commit the result. A failure leaves the previous result in place.
    pub async fn process(&self, session_id: &str, content_id: &str) -> Result<ProcessingResult> {
        let session = self.session(session_id).await?;
        let content = selector::resolve(&session, content_id)?;
        let guard = InFlightGuard::acquire(&self.in_flight, session_id)?;

        let processor = self.factory.processor()?;
        let request = ProcessingRequest::from_settings(content, &session.settings);
        let storage = self.storage.clone();
        let session_id = session_id.to_string();

        let task = tokio::spawn(async move {
            let _guard = guard;
            let result = processing::run_processing(processor, request).await?;

            let mut session = storage
                .get(&session_id)
                .await?
                .ok_or_else(|| DeskError::SessionNotFound(session_id.clone()))?;
            session.ai_result = Some(result.clone());
            storage.save(session).await?;

            info!(session_id = %session_id, "Processing result committed");
            Ok::<_, DeskError>(result)
        });

        task.await
            .map_err(|e| DeskError::Task(e.to_string()))?
            .inspect_err(|e| error!("Processing failed: {}", e))
    }

    pub async fn result_view(&self, session_id: &str) -> Result<ResultView> {
        let session = self.session(session_id).await?;
        session
            .ai_result
            .as_ref()
            .map(ResultView::from_result)
            .ok_or(DeskError::NoResult)
    }

    pub async fn copy(&self, session_id: &str) -> Result<CopyReport> {
        let session = self.session(session_id).await?;
        let result = session.ai_result.as_ref().ok_or(DeskError::NoResult)?;
        let uploader = self.uploader_for(&session)?;
        export::copy_text(uploader.as_ref(), result)
    }

    pub async fn save(&self, session_id: &str, platform: Platform) -> Result<SaveReport> {
        let session = self.session(session_id).await?;
        let result = session.ai_result.as_ref().ok_or(DeskError::NoResult)?;
        let uploader = self.uploader_for(&session)?;
        Ok(export::save_result(uploader.as_ref(), platform, result).await)
    }

    fn uploader_for(&self, session: &SessionState) -> Result<Arc<dyn Uploader>> {
        match &session.uploader {
            Some(uploader) => Ok(uploader.clone()),
            None => Err(DeskError::Config(
                session
                    .init_error
                    .clone()
                    .unwrap_or_else(|| "Uploader is not initialized".to_string()),
            )),
        }
    }
}

/// Marks a session busy until dropped.
struct InFlightGuard {
    sessions: Arc<DashSet<String>>,
    session_id: String,
}

impl InFlightGuard {
    fn acquire(sessions: &Arc<DashSet<String>>, session_id: &str) -> Result<Self> {
        if !sessions.insert(session_id.to_string()) {
            return Err(DeskError::Busy(session_id.to_string()));
        }
        Ok(Self {
            sessions: sessions.clone(),
            session_id: session_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.sessions.remove(&self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeFactory, item};
    use crate::models::ProcessingKind;
    use crate::search::SearchStage;
    use crate::session::InMemorySessionStorage;
    use crate::settings::{AiMode, Language};
    use tokio::sync::Notify;

    async fn searched(factory: FakeFactory) -> (Dashboard, String) {
        let factory = factory.with_results(vec![item("A"), item("B")], vec![item("C")], vec![]);
        let dashboard = Dashboard::new(
            Arc::new(InMemorySessionStorage::new()),
            Arc::new(factory),
        );
        dashboard.open_session("s").await.unwrap();
        dashboard
            .search("s", "rust", &mut Vec::<SearchStage>::new())
            .await
            .unwrap();
        let first = dashboard.contents("s").await.unwrap()[0].id.clone();
        (dashboard, first)
    }

    #[tokio::test]
    async fn process_commits_result() {
        let (dashboard, content_id) = searched(FakeFactory::default()).await;

        let result = dashboard.process("s", &content_id).await.unwrap();

        assert_eq!(result.kind, ProcessingKind::Restructured);
        let view = dashboard.result_view("s").await.unwrap();
        assert_eq!(view.body, "long:A");
        assert!(!dashboard.is_processing("s"));
    }

    #[tokio::test]
    async fn translation_failure_keeps_previous_result() {
        let (dashboard, content_id) = searched(FakeFactory::default().failing_translate()).await;
        let previous = dashboard.process("s", &content_id).await.unwrap();

        dashboard
            .apply_settings(
                "s",
                Settings {
                    ai_mode: AiMode::Summarize,
                    translation_enabled: true,
                    target_language: Language::Ko,
                    ..Settings::default()
                },
            )
            .await
            .unwrap();
        let second = dashboard.contents("s").await.unwrap()[2].id.clone();

        let err = dashboard.process("s", &second).await.unwrap_err();

        assert!(matches!(err, DeskError::Processor(_)));
        let session = dashboard.session("s").await.unwrap();
        assert_eq!(session.ai_result, Some(previous));
        assert!(!dashboard.is_processing("s"));
    }

    #[tokio::test]
    async fn second_trigger_is_rejected_while_pending() {
        let gate = Arc::new(Notify::new());
        let (dashboard, content_id) = searched(FakeFactory::default().gated(gate.clone())).await;

        let pending = {
            let dashboard = dashboard.clone();
            let content_id = content_id.clone();
            tokio::spawn(async move { dashboard.process("s", &content_id).await })
        };
        while !dashboard.is_processing("s") {
            tokio::task::yield_now().await;
        }

        let err = dashboard.process("s", &content_id).await.unwrap_err();
        assert!(matches!(err, DeskError::Busy(_)));

        gate.notify_one();
        pending.await.unwrap().unwrap();
        assert!(!dashboard.is_processing("s"));
    }

    #[tokio::test]
    async fn unknown_content_is_rejected_before_processing() {
        let factory = FakeFactory::default();
        let log = factory.log.clone();
        let (dashboard, _) = searched(factory).await;

        let err = dashboard.process("s", "0:news:9").await.unwrap_err();
        assert!(matches!(err, DeskError::ContentNotFound(_)));
        assert_eq!(log.count("factory.processor"), 0);
    }

    #[tokio::test]
    async fn copy_and_save_need_a_result() {
        let (dashboard, _) = searched(FakeFactory::default()).await;

        assert!(matches!(
            dashboard.copy("s").await.unwrap_err(),
            DeskError::NoResult
        ));
        assert!(matches!(
            dashboard.save("s", Platform::LocalNotes).await.unwrap_err(),
            DeskError::NoResult
        ));
    }

    #[tokio::test]
    async fn save_after_processing() {
        let (dashboard, content_id) = searched(FakeFactory::default()).await;
        dashboard.process("s", &content_id).await.unwrap();

        let report = dashboard.save("s", Platform::LocalNotes).await.unwrap();
        assert!(report.success);
        assert_eq!(report.detail.as_deref(), Some("Saved to: /notes/x.md"));

        let copy = dashboard.copy("s").await.unwrap();
        assert_eq!(copy.text, "<<long:A>>");
    }

    #[tokio::test]
    async fn new_search_keeps_result_and_retires_ids() {
        let (dashboard, content_id) = searched(FakeFactory::default()).await;
        dashboard.process("s", &content_id).await.unwrap();

        dashboard
            .search("s", "rust", &mut Vec::<SearchStage>::new())
            .await
            .unwrap();

        assert!(dashboard.session("s").await.unwrap().ai_result.is_some());
        assert!(matches!(
            dashboard.process("s", &content_id).await.unwrap_err(),
            DeskError::ContentNotFound(_)
        ));
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_unless_busy() {
        let gate = Arc::new(Notify::new());
        let (dashboard, content_id) = searched(FakeFactory::default().gated(gate.clone())).await;
        dashboard.open_session("other").await.unwrap();

        let evicted = dashboard.evict_idle(Duration::from_secs(3600)).await.unwrap();
        assert!(evicted.is_empty());

        let pending = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move { dashboard.process("s", &content_id).await })
        };
        while !dashboard.is_processing("s") {
            tokio::task::yield_now().await;
        }

        let evicted = dashboard.evict_idle(Duration::ZERO).await.unwrap();
        assert_eq!(evicted, vec!["other".to_string()]);
        assert!(matches!(
            dashboard.session("other").await.unwrap_err(),
            DeskError::SessionNotFound(_)
        ));

        gate.notify_one();
        pending.await.unwrap().unwrap();
        assert_eq!(dashboard.evict_idle(Duration::ZERO).await.unwrap(), vec!["s".to_string()]);
    }

    #[tokio::test]
    async fn settings_are_clamped_on_apply() {
        let (dashboard, _) = searched(FakeFactory::default()).await;
        let applied = dashboard
            .apply_settings(
                "s",
                Settings {
                    news_count: 99,
                    ..Settings::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(applied.news_count, 20);
    }

    #[tokio::test]
    async fn missing_session_is_reported() {
        let dashboard = Dashboard::new(
            Arc::new(InMemorySessionStorage::new()),
            Arc::new(FakeFactory::default()),
        );

        assert!(matches!(
            dashboard.contents("nope").await.unwrap_err(),
            DeskError::SessionNotFound(_)
        ));
    }
}
