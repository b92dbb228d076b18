use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::CONTENT_TYPE},
    middleware::{Next, from_fn},
    response::{Json, Response},
    routing::{get, post},
};
use prompt_flow::ModelClient;
use serde::Deserialize;
use serde_json::{Value, json};
use std::{future::Future, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    config::FlowCapabilities,
    controller::{OrchestrationController, PaperSubmission},
    error::ServiceError,
    flows::PaperFlows,
    ingest::decode_paper,
    models::{Notice, SendMessageRequest, SubmitPaperRequest, SummaryOptions},
    storage::{InMemorySessionStorage, SessionStorage},
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);
type Accepted = Result<(StatusCode, Json<Value>), ApiError>;

const CORRELATION_HEADER: &str = "x-correlation-id";

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn rejected_error(status: StatusCode, notice: Notice) -> ApiError {
    (
        status,
        Json(json!({
            "error": notice.description,
            "notice": notice
        })),
    )
}

fn service_error(err: &ServiceError) -> ApiError {
    match err {
        ServiceError::SessionNotFound(id) => not_found_error("Session not found", id),
        ServiceError::Ingest(e) => rejected_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, e.notice()),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub session_storage: Arc<dyn SessionStorage>,
    pub flows: Arc<PaperFlows>,
    pub capabilities: FlowCapabilities,
}

impl AppState {
    pub fn new(model: Arc<dyn ModelClient>, capabilities: FlowCapabilities) -> Self {
        Self {
            session_storage: Arc::new(InMemorySessionStorage::new()),
            flows: Arc::new(PaperFlows::new(model)),
            capabilities,
        }
    }
}

/// When `wait` is set the request only returns once the model work has been
/// committed; otherwise the work runs in the background.
#[derive(Debug, Default, Deserialize)]
pub struct WaitQuery {
    #[serde(default)]
    pub wait: bool,
}

pub fn create_app(model: Arc<dyn ModelClient>, capabilities: FlowCapabilities) -> Router {
    build_router(AppState::new(model, capabilities))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/{session_id}", get(get_session).delete(delete_session))
        .route("/sessions/{session_id}/notices", get(drain_notices))
        .route("/sessions/{session_id}/paper", post(submit_paper))
        .route("/sessions/{session_id}/paper/file", post(upload_paper))
        .route("/sessions/{session_id}/messages", post(send_message))
        .route("/sessions/{session_id}/clear", post(clear_session))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let header = HeaderValue::from_str(&correlation_id).ok();
    if let Some(value) = &header {
        request.headers_mut().insert(CORRELATION_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Scholar Chat Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Summaries, keywords and question answering over research papers",
        "endpoints": {
            "POST /sessions": "Create a new session",
            "GET /sessions/{session_id}": "Get the session snapshot",
            "GET /sessions/{session_id}/notices": "Drain pending notices",
            "POST /sessions/{session_id}/paper": "Submit paper text for summary and keywords",
            "POST /sessions/{session_id}/paper/file": "Upload a plain-text paper file",
            "POST /sessions/{session_id}/messages": "Ask a question about the loaded paper",
            "POST /sessions/{session_id}/clear": "Clear paper, results and chat",
            "DELETE /sessions/{session_id}": "Delete the session",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn create_session(State(state): State<AppState>) -> Accepted {
    let controller = OrchestrationController::new(state.flows.clone(), state.capabilities);
    let session_id = controller.id().to_string();

    state
        .session_storage
        .save(controller.clone())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create session");
            internal_error("Failed to create session", &e.to_string())
        })?;

    info!(session_id = %session_id, "Session created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "session_id": session_id,
            "capabilities": state.capabilities,
            "session": controller.snapshot().await
        })),
    ))
}

async fn load_session(
    state: &AppState,
    session_id: &str,
) -> Result<OrchestrationController, ApiError> {
    state.session_storage.require(session_id).await.map_err(|e| {
        warn!(session_id, error = %e, "Failed to load session");
        service_error(&e)
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    let session = load_session(&state, &session_id).await?;
    Ok(Json(json!({
        "session_id": session_id,
        "session": session.snapshot().await
    })))
}

async fn drain_notices(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    let session = load_session(&state, &session_id).await?;
    Ok(Json(json!({
        "session_id": session_id,
        "notices": session.drain_notices().await
    })))
}

async fn dispatch<F>(wait: bool, work: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if wait {
        work.await;
    } else {
        tokio::spawn(work);
    }
}

async fn start_submission(
    session: OrchestrationController,
    submission: PaperSubmission,
    wait: bool,
) -> Accepted {
    let pending = session
        .begin_submission(submission)
        .await
        .map_err(|notice| rejected_error(StatusCode::UNPROCESSABLE_ENTITY, notice))?;
    let generation = pending.generation();

    dispatch(wait, pending.run()).await;

    let status = if wait { StatusCode::OK } else { StatusCode::ACCEPTED };
    Ok((
        status,
        Json(json!({
            "session_id": session.id(),
            "generation": generation,
            "session": session.snapshot().await
        })),
    ))
}

async fn submit_paper(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<WaitQuery>,
    Json(request): Json<SubmitPaperRequest>,
) -> Accepted {
    let session = load_session(&state, &session_id).await?;
    info!(session_id = %session_id, complexity = %request.complexity, language = %request.language, "Paper submitted");

    let submission = PaperSubmission::new(request.text)
        .with_complexity(request.complexity)
        .with_language(request.language);
    start_submission(session, submission, query.wait).await
}

async fn upload_paper(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(options): Query<SummaryOptions>,
    headers: HeaderMap,
    body: Bytes,
) -> Accepted {
    let session = load_session(&state, &session_id).await?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let name = options.filename.as_deref().unwrap_or("paper.txt");

    let file = match decode_paper(name, content_type, body.to_vec()) {
        Ok(file) => file,
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "Upload rejected");
            session.reject(e.notice()).await;
            return Err(service_error(&ServiceError::from(e)));
        }
    };

    info!(session_id = %session_id, file = %file.name, "Paper file uploaded");
    let submission = PaperSubmission::new(file.text)
        .with_complexity(options.complexity)
        .with_language(options.language);
    start_submission(session, submission, options.wait).await
}

async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<WaitQuery>,
    Json(request): Json<SendMessageRequest>,
) -> Accepted {
    let session = load_session(&state, &session_id).await?;

    let pending = session
        .begin_message(&request.question, request.eli5)
        .await
        .map_err(|notice| rejected_error(StatusCode::UNPROCESSABLE_ENTITY, notice))?;
    let generation = pending.generation();
    info!(session_id = %session_id, eli5 = request.eli5, "Question received");

    dispatch(query.wait, pending.run()).await;

    let status = if query.wait { StatusCode::OK } else { StatusCode::ACCEPTED };
    Ok((
        status,
        Json(json!({
            "session_id": session_id,
            "generation": generation,
            "session": session.snapshot().await
        })),
    ))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    let session = load_session(&state, &session_id).await?;
    let generation = session.clear_all().await;
    Ok(Json(json!({
        "session_id": session_id,
        "generation": generation,
        "session": session.snapshot().await
    })))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    let session = load_session(&state, &session_id).await?;
    session.clear_all().await;

    state
        .session_storage
        .delete(&session_id)
        .await
        .map_err(|e| {
            error!(session_id = %session_id, error = %e, "Failed to delete session");
            internal_error("Failed to delete session", &e.to_string())
        })?;

    info!(session_id = %session_id, "Session deleted");
    Ok(Json(json!({
        "session_id": session_id,
        "status": "deleted"
    })))
}
