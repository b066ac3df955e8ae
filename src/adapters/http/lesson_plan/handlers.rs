//! HTTP handlers for the lesson plan page and API.
//!
//! Form endpoints always answer with a redirect back to `/`; whatever went
//! wrong is already in the workspace error banner. JSON endpoints map
//! workspace errors to `ErrorResponse` bodies.

use std::sync::Arc;

use axum::extract::{Form, Json, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::{debug, info};

use crate::adapters::view::render_page;
use crate::application::{PlanWorkspace, WorkspaceError};
use crate::domain::lesson_plan::{LessonPlan, LessonPlanFormData, PlanError};
use crate::ports::{ExportFormat, ExportedDocument};

use super::dto::{ErrorResponse, FeedbackRequest, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state: the single plan workspace.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<PlanWorkspace>,
}

impl AppState {
    pub fn new(workspace: Arc<PlanWorkspace>) -> Self {
        Self { workspace }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Page Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET / - Render the full page from the current workspace state.
pub async fn show_page(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.workspace.snapshot()))
}

/// POST /plan - Generate a plan from the submitted form.
pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<LessonPlanFormData>,
) -> Redirect {
    info!(topic = %form.topic, age_group = %form.age_group, "Lesson plan form submitted");
    if let Err(err) = state.workspace.submit(form).await {
        debug!(error = %err, "Form submission did not produce a plan");
    }
    Redirect::to("/")
}

/// POST /plan/revise - Revise the held plan with the feedback text.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Form(req): Form<FeedbackRequest>,
) -> Redirect {
    if let Err(err) = state.workspace.revise(&req.feedback).await {
        debug!(error = %err, "Feedback submission did not produce a plan");
    }
    Redirect::to("/")
}

/// POST /plan/clear - Discard the held plan.
pub async fn clear_plan(State(state): State<AppState>) -> Redirect {
    state.workspace.clear();
    Redirect::to("/")
}

/// POST /error/dismiss - Hide the error banner.
pub async fn dismiss_error(State(state): State<AppState>) -> Redirect {
    state.workspace.dismiss_error();
    Redirect::to("/")
}

/// GET /plan/export/:format - Download the held plan.
///
/// 204 when there is nothing to download: no plan, or the exporter failed.
pub async fn export_plan(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format
        .parse()
        .map_err(|_| ApiError::UnsupportedFormat(format))?;

    match state.workspace.export(format).await {
        Some(document) => Ok(download(document)),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

fn download(document: ExportedDocument) -> Response {
    let disposition = content_disposition(&document.filename);
    (
        [
            (header::CONTENT_TYPE, document.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.content,
    )
        .into_response()
}

/// `attachment` with an ASCII fallback and the RFC 5987 UTF-8 name.
pub(crate) fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

// ════════════════════════════════════════════════════════════════════════════════
// API Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/plan - The held plan.
pub async fn get_plan(State(state): State<AppState>) -> Result<Json<LessonPlan>, ApiError> {
    state
        .workspace
        .current_plan()
        .map(Json)
        .ok_or(ApiError::PlanNotFound)
}

/// POST /api/plan - Generate a plan from a JSON form.
pub async fn generate_plan(
    State(state): State<AppState>,
    Json(form): Json<LessonPlanFormData>,
) -> Result<Json<LessonPlan>, ApiError> {
    let plan = state.workspace.submit(form).await?;
    Ok(Json(plan))
}

/// POST /api/plan/revise - Revise the held plan.
///
/// 204 when there is no plan or the feedback is blank.
pub async fn revise_plan(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Response, ApiError> {
    match state.workspace.revise(&req.feedback).await? {
        Some(plan) => Ok(Json(plan).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.workspace.provider_info();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: provider.name,
        model: provider.model,
        has_plan: state.workspace.current_plan().is_some(),
        export_formats: state
            .workspace
            .export_formats()
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts workspace errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Workspace(WorkspaceError),
    PlanNotFound,
    UnsupportedFormat(String),
}

impl From<WorkspaceError> for ApiError {
    fn from(err: WorkspaceError) -> Self {
        Self::Workspace(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Workspace(WorkspaceError::Validation(err)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_FAILED", err.to_string()),
            ),
            ApiError::Workspace(WorkspaceError::Busy(operation)) => (
                StatusCode::CONFLICT,
                ErrorResponse::with_details(
                    "OPERATION_IN_PROGRESS",
                    format!("A {} is already in progress", operation),
                    serde_json::json!({ "operation": operation.to_string() }),
                ),
            ),
            ApiError::Workspace(WorkspaceError::Plan(PlanError::Validation(err))) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_FAILED", err.to_string()),
            ),
            ApiError::Workspace(WorkspaceError::Plan(err)) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new(err.code(), err.to_string()),
            ),
            ApiError::PlanNotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("PLAN_NOT_FOUND", "No lesson plan has been generated yet"),
            ),
            ApiError::UnsupportedFormat(format) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(
                    "UNSUPPORTED_FORMAT",
                    format!("Unsupported export format: {}", format),
                ),
            ),
        };

        (status, Json(body)).into_response()
    }
}
