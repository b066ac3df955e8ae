//! Request and response bodies for the lesson plan endpoints.
//!
//! The plan itself and the form travel as their domain types; only the
//! envelope types live here.

use serde::{Deserialize, Serialize};

/// Revision request, from the feedback form or the JSON API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackRequest {
    pub feedback: String,
}

/// Liveness report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub model: String,
    pub has_plan: bool,
    pub export_formats: Vec<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error body for API errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable message, shown as-is in the UI.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}
