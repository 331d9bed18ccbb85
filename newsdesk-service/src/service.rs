use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::{Html, Json, Response},
    routing::{get, post, put},
};
use newsdesk::{
    CopyReport, Dashboard, DeskError, InMemorySessionStorage, ResultView, SaveReport,
    SearchResultsView, Settings,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    clients::LiveCollaborators,
    config::Config,
    models::{
        ContentEntry, ProcessRequest, ProcessResponse, ProgressLog, SaveRequest, SearchRequest,
        SearchResponse, SessionResponse, content_entries,
    },
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

const INDEX_HTML: &str = include_str!("../static/index.html");

fn error_body(status: StatusCode, message: &str, details: &str) -> ApiError {
    (
        status,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

/// Map a dashboard error onto a status code and a generic banner; the raw
/// error text travels in `details`.
fn api_error(e: DeskError) -> ApiError {
    let details = e.to_string();
    let (status, message) = match &e {
        DeskError::Validation(message) => (StatusCode::BAD_REQUEST, message.as_str()),
        DeskError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "Session not found"),
        DeskError::ContentNotFound(_) => (StatusCode::NOT_FOUND, "Selected content not found"),
        DeskError::NoResult => (StatusCode::NOT_FOUND, "Run AI processing first"),
        DeskError::Busy(_) => (StatusCode::CONFLICT, "AI processing is already running"),
        DeskError::Crawler(_) => (StatusCode::BAD_GATEWAY, "An error occurred during search"),
        DeskError::Processor(_) => (
            StatusCode::BAD_GATEWAY,
            "An error occurred during AI processing",
        ),
        DeskError::Uploader(_) => (StatusCode::BAD_GATEWAY, "An error occurred while exporting"),
        DeskError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "Initialization failed"),
        DeskError::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    };

    if status.is_server_error() {
        error!(status = %status, error = %details, "Request failed");
    } else {
        warn!(status = %status, error = %details, "Request rejected");
    }
    error_body(status, message, &details)
}

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self { dashboard }
    }
}

const MAX_REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the app and start the idle-session reaper. Must run inside a tokio
/// runtime.
pub fn create_app(config: Config) -> Router {
    let idle_timeout = config.session_idle_timeout;
    let dashboard = Dashboard::new(
        Arc::new(InMemorySessionStorage::new()),
        Arc::new(LiveCollaborators::new(config)),
    );
    spawn_session_reaper(dashboard.clone(), idle_timeout);
    build_router(AppState::new(dashboard))
}

/// Periodically drop sessions idle for at least `max_idle`.
pub fn spawn_session_reaper(dashboard: Dashboard, max_idle: Duration) -> JoinHandle<()> {
    let period = max_idle.clamp(Duration::from_secs(1), MAX_REAP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = dashboard.evict_idle(max_idle).await {
                error!(error = %e, "Idle session eviction failed");
            }
        }
    })
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/settings", put(update_settings))
        .route("/sessions/{id}/search", post(search))
        .route("/sessions/{id}/contents", get(list_contents))
        .route("/sessions/{id}/process", post(process))
        .route("/sessions/{id}/result", get(get_result))
        .route("/sessions/{id}/copy", post(copy_result))
        .route("/sessions/{id}/save", post(save_result))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tag each request with a correlation id header and tracing span
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn create_session(State(state): State<AppState>) -> ApiResult<SessionResponse> {
    let session_id = Uuid::new_v4().to_string();
    let session = state
        .dashboard
        .open_session(&session_id)
        .await
        .map_err(api_error)?;

    if let Some(init_error) = &session.init_error {
        warn!(
            session_id = %session_id,
            error = %init_error,
            "Session opened without collaborators"
        );
    } else {
        info!(session_id = %session_id, "Session opened");
    }
    Ok(Json(SessionResponse::from_session(&session, false)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    let session = state
        .dashboard
        .session(&session_id)
        .await
        .map_err(api_error)?;
    let processing = state.dashboard.is_processing(&session_id);
    Ok(Json(SessionResponse::from_session(&session, processing)))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .dashboard
        .close_session(&session_id)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_settings(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(settings): Json<Settings>,
) -> ApiResult<Settings> {
    let applied = state
        .dashboard
        .apply_settings(&session_id, settings)
        .await
        .map_err(api_error)?;
    Ok(Json(applied))
}

/// Commit the settings sent alongside a trigger so the run reads them.
async fn apply_panel_settings(
    state: &AppState,
    session_id: &str,
    settings: Option<Settings>,
) -> Result<(), ApiError> {
    if let Some(settings) = settings {
        state
            .dashboard
            .apply_settings(session_id, settings)
            .await
            .map_err(api_error)?;
    }
    Ok(())
}

async fn search(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<SearchResponse> {
    info!(session_id = %session_id, keyword = %request.keyword, "Search requested");
    apply_panel_settings(&state, &session_id, request.settings).await?;

    let mut progress = ProgressLog::default();
    let summary = state
        .dashboard
        .search(&session_id, &request.keyword, &mut progress)
        .await
        .map_err(api_error)?;

    let session = state
        .dashboard
        .session(&session_id)
        .await
        .map_err(api_error)?;

    Ok(Json(SearchResponse {
        message: summary.message(),
        summary,
        progress: progress.events,
        results: SearchResultsView::from_session(&session),
        contents: content_entries(&session),
    }))
}

async fn list_contents(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Vec<ContentEntry>> {
    let contents = state
        .dashboard
        .contents(&session_id)
        .await
        .map_err(api_error)?;
    Ok(Json(contents.iter().map(ContentEntry::from).collect()))
}

async fn process(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<ProcessResponse> {
    info!(session_id = %session_id, content_id = %request.content_id, "Processing requested");
    apply_panel_settings(&state, &session_id, request.settings).await?;

    let result = state
        .dashboard
        .process(&session_id, &request.content_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ProcessResponse {
        view: ResultView::from_result(&result),
        result,
    }))
}

async fn get_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ResultView> {
    let view = state
        .dashboard
        .result_view(&session_id)
        .await
        .map_err(api_error)?;
    Ok(Json(view))
}

async fn copy_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<CopyReport> {
    let report = state
        .dashboard
        .copy(&session_id)
        .await
        .map_err(api_error)?;
    Ok(Json(report))
}

async fn save_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SaveRequest>,
) -> ApiResult<SaveReport> {
    let report = state
        .dashboard
        .save(&session_id, request.platform)
        .await
        .map_err(api_error)?;
    Ok(Json(report))
}
