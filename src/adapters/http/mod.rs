//! HTTP adapters - page and REST endpoints.

pub mod lesson_plan;

use axum::routing::get;
use axum::Router;

pub use lesson_plan::{lesson_plan_routes, ApiError, AppState, ErrorResponse};

/// Complete application router with state applied.
///
/// Middleware (tracing, CORS) is layered on by the binary.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(lesson_plan_routes())
        .route("/health", get(lesson_plan::handlers::health))
        .with_state(state)
}
