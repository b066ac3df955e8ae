//! Shared request path for generation and revision.

use tracing::{debug, warn};

use crate::domain::lesson_plan::{lesson_plan_schema, prompts, LessonPlan, PlanError};
use crate::ports::{AIProvider, StructuredRequest};

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Builds the schema-constrained request for a prompt.
pub(super) fn plan_request(prompt: String, temperature: f32) -> StructuredRequest {
    StructuredRequest::new(prompt, lesson_plan_schema().clone())
        .with_system_instruction(prompts::SYSTEM_INSTRUCTION)
        .with_temperature(temperature)
}

/// Sends one request and turns the reply into a plan.
///
/// Absent or empty text is `EmptyResponse`; anything that does not
/// deserialize into a complete plan is `Parse`.
pub(super) async fn fetch_plan(
    ai: &dyn AIProvider,
    request: StructuredRequest,
) -> Result<LessonPlan, PlanError> {
    let trace_id = request.trace_id.clone();
    let response = ai.generate_structured(request).await?;

    let text = response.non_empty_text().ok_or_else(|| {
        warn!(%trace_id, finish_reason = ?response.finish_reason, "AI returned no text");
        PlanError::EmptyResponse
    })?;

    debug!(%trace_id, text_len = text.len(), "Parsing lesson plan");

    LessonPlan::from_model_text(text).map_err(|e| {
        warn!(%trace_id, error = %e, "AI text is not a lesson plan");
        e
    })
}
