//! HTTP adapter for the lesson plan workspace.
//!
//! Serves the server-rendered page with its form posts and downloads, plus a
//! small JSON API over the same workspace.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, FeedbackRequest, HealthResponse};
pub use handlers::{ApiError, AppState};
pub use routes::lesson_plan_routes;
