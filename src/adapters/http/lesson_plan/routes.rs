//! Axum router configuration for the lesson plan endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    clear_plan, dismiss_error, export_plan, generate_plan, get_plan, revise_plan, show_page,
    submit_feedback, submit_form, AppState,
};

/// Create the lesson plan router.
///
/// # Routes
///
/// ## Page (form posts redirect back to `/`)
/// - `GET /` - Full page
/// - `POST /plan` - Generate from the form
/// - `POST /plan/revise` - Revise with feedback
/// - `POST /plan/clear` - Discard the held plan
/// - `POST /error/dismiss` - Hide the error banner
/// - `GET /plan/export/:format` - Download as docx, pdf or pptx
///
/// ## API
/// - `GET /api/plan` - Held plan as JSON
/// - `POST /api/plan` - Generate from a JSON form
/// - `POST /api/plan/revise` - Revise with `{ "feedback": ... }`
pub fn lesson_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(show_page))
        .route("/plan", post(submit_form))
        .route("/plan/revise", post(submit_feedback))
        .route("/plan/clear", post(clear_plan))
        .route("/error/dismiss", post(dismiss_error))
        .route("/plan/export/:format", get(export_plan))
        .route("/api/plan", get(get_plan).post(generate_plan))
        .route("/api/plan/revise", post(revise_plan))
}
