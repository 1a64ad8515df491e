//! HTTP API server.
//!
//! Exposes note CRUD and the LLM-backed operations via a JSON HTTP API, and
//! serves the static browser frontend from the configured assets directory.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/notes` | Create a note |
//! | `GET`  | `/api/notes` | List notes, newest first |
//! | `GET`  | `/api/notes/{id}` | Fetch one note |
//! | `PUT`  | `/api/notes/{id}` | Partial update of title/body/tags |
//! | `DELETE` | `/api/notes/{id}` | Delete a note |
//! | `POST` | `/api/notes/{id}/summarize` | Summarize the body into `summary` |
//! | `POST` | `/api/notes/{id}/generate-title` | Generate and store a title |
//! | `POST` | `/api/notes/{id}/elaborate` | Expand body (or title) into `elaboration` |
//! | `POST` | `/api/notes/llm` | Apply a template to an arbitrary prompt, no storage |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Either title or body is required." } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `config_error`,
//! `upstream_error`, `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted; the frontend may be
//! served from this process or any other origin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::llm::{LlmClient, PromptKind};
use crate::models::{CreateNote, Note, UpdateNote};
use crate::repo::NoteRepository;
use crate::{db, migrate};

/// Shared application state passed to all route handlers via Axum's `State`
/// extractor. Both fields are cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub repo: NoteRepository,
    pub llm: LlmClient,
}

/// Starts the HTTP server.
///
/// Connects to the database (running migrations if needed), builds the
/// router, binds the configured address, and serves until the process is
/// terminated. Fatal startup errors (bind failure, unreachable database)
/// propagate to `main` and terminate the process.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply(&pool).await?;

    let state = AppState {
        repo: NoteRepository::new(pool),
        llm: LlmClient::new(config.llm.clone())?,
    };

    let app = router(state, config.server.assets_dir.as_deref());

    info!("inkpad listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router. Public so the integration tests can drive
/// the service in-process.
pub fn router(state: AppState, assets_dir: Option<&std::path::Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/notes", post(handle_create_note).get(handle_list_notes))
        .route("/api/notes/llm", post(handle_freeform_llm))
        .route(
            "/api/notes/{id}",
            get(handle_get_note)
                .put(handle_update_note)
                .delete(handle_delete_note),
        )
        .route("/api/notes/{id}/summarize", post(handle_summarize))
        .route("/api/notes/{id}/generate-title", post(handle_generate_title))
        .route("/api/notes/{id}/elaborate", post(handle_elaborate))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(dir) = assets_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs a 404 Not Found error.
fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Constructs a 500 error for anything without a more specific mapping.
fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(message) => bad_request(message),
            Error::NotFound(message) => not_found(message),
            Error::Config(message) => AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "config_error".to_string(),
                message,
            },
            Error::Upstream { .. } => AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "upstream_error".to_string(),
                message: err.to_string(),
            },
            Error::Db(e) => internal(e.to_string()),
            Error::Http(e) => internal(e.to_string()),
        }
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Note CRUD ============

/// Handler for `POST /api/notes`.
///
/// Creates a note from `{title?, body?, tags?}`. Returns `201` with the
/// persisted note, or `400` when both title and body are empty.
async fn handle_create_note(
    State(state): State<AppState>,
    Json(fields): Json<CreateNote>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let note = state.repo.create(fields).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Handler for `GET /api/notes`.
///
/// Returns all notes ordered by creation time descending.
async fn handle_list_notes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Note>>, AppError> {
    Ok(Json(state.repo.list().await?))
}

/// Handler for `GET /api/notes/{id}`.
async fn handle_get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    Ok(Json(state.repo.get(&id).await?))
}

/// Handler for `PUT /api/notes/{id}`.
///
/// Partial update: absent fields are left unchanged; a present `tags` array
/// replaces the full tag set.
async fn handle_update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<UpdateNote>,
) -> Result<Json<Note>, AppError> {
    Ok(Json(state.repo.update(&id, fields).await?))
}

/// JSON response body for `DELETE /api/notes/{id}`.
#[derive(Serialize)]
struct DeleteResponse {
    message: String,
}

/// Handler for `DELETE /api/notes/{id}`. Removal is permanent.
async fn handle_delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.repo.delete(&id).await?;
    Ok(Json(DeleteResponse {
        message: "Note successfully deleted.".to_string(),
    }))
}

// ============ LLM-backed note operations ============

/// JSON response body for all LLM endpoints.
#[derive(Serialize)]
struct AiResponse {
    #[serde(rename = "aiResponse")]
    ai_response: String,
}

/// Handler for `POST /api/notes/{id}/summarize`.
///
/// Summarizes the note's body into its `summary` field. Returns `404` when
/// the note is missing or its body is empty — in that case the upstream is
/// never called.
async fn handle_summarize(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AiResponse>, AppError> {
    let note = state.repo.get(&id).await?;
    if note.body.is_empty() {
        return Err(not_found("Note not found or body is empty."));
    }

    let prompt = PromptKind::Summarize.render(&note.body);
    let text = state.llm.generate(&prompt).await?;
    state.repo.set_summary(&id, &text).await?;

    Ok(Json(AiResponse { ai_response: text }))
}

/// Handler for `POST /api/notes/{id}/generate-title`.
///
/// Generates a short title from the note's body and stores it as the note's
/// `title`, after stripping quote characters and surrounding whitespace.
async fn handle_generate_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AiResponse>, AppError> {
    let note = state.repo.get(&id).await?;
    if note.body.is_empty() {
        return Err(not_found("Note not found or body is empty."));
    }

    let prompt = PromptKind::GenerateTitle.render(&note.body);
    let raw = state.llm.generate(&prompt).await?;
    let title = PromptKind::GenerateTitle.postprocess(&raw);
    state.repo.set_title(&id, &title).await?;

    Ok(Json(AiResponse { ai_response: title }))
}

/// Handler for `POST /api/notes/{id}/elaborate`.
///
/// Expands the note's body (or title, when the body is empty) into its
/// `elaboration` field. `404` when the note is missing, `400` when it has
/// neither title nor body to elaborate on.
async fn handle_elaborate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AiResponse>, AppError> {
    let note = state.repo.get(&id).await?;
    let subject = if note.body.is_empty() {
        &note.title
    } else {
        &note.body
    };
    if subject.is_empty() {
        return Err(bad_request("Note has no title or body to elaborate on."));
    }

    let prompt = PromptKind::Elaborate.render(subject);
    let text = state.llm.generate(&prompt).await?;
    state.repo.set_elaboration(&id, &text).await?;

    Ok(Json(AiResponse { ai_response: text }))
}

// ============ POST /api/notes/llm ============

/// Request body for `POST /api/notes/llm`.
#[derive(Deserialize)]
struct FreeformLlmRequest {
    /// Template name: `summarize`, `generate-title`, or `elaborate`.
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
}

/// Handler for `POST /api/notes/llm`.
///
/// Applies the named template to an arbitrary subject string and returns the
/// raw AI text without touching storage.
async fn handle_freeform_llm(
    State(state): State<AppState>,
    Json(request): Json<FreeformLlmRequest>,
) -> Result<Json<AiResponse>, AppError> {
    let (kind, prompt) = match (request.kind.as_deref(), request.prompt.as_deref()) {
        (Some(kind), Some(prompt)) if !kind.is_empty() && !prompt.is_empty() => (kind, prompt),
        _ => return Err(bad_request("Prompt and type are required.")),
    };

    let kind = PromptKind::parse(kind).ok_or_else(|| bad_request("Invalid LLM type."))?;

    let raw = state.llm.generate(&kind.render(prompt)).await?;
    Ok(Json(AiResponse {
        ai_response: kind.postprocess(&raw),
    }))
}
