//! GeneratePlanHandler - Produces a lesson plan from the submitted form.

use std::sync::Arc;

use tracing::info;

use crate::domain::lesson_plan::{prompts, LessonPlan, LessonPlanFormData, PlanError};
use crate::ports::{AIProvider, ProviderInfo};

use super::plan_request::{fetch_plan, plan_request, DEFAULT_TEMPERATURE};

/// Handler for generating a lesson plan.
pub struct GeneratePlanHandler {
    ai_provider: Arc<dyn AIProvider>,
    temperature: f32,
}

impl GeneratePlanHandler {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self {
            ai_provider,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The provider and model plans come from.
    pub fn provider_info(&self) -> ProviderInfo {
        self.ai_provider.provider_info()
    }

    /// Validates the form, then issues exactly one structured request.
    ///
    /// A missing topic fails before anything is sent.
    pub async fn handle(&self, form: &LessonPlanFormData) -> Result<LessonPlan, PlanError> {
        // 1. Validate
        form.validate()?;

        // 2. Build request
        let request = plan_request(prompts::generation_prompt(form), self.temperature);
        info!(
            trace_id = %request.trace_id,
            topic = %form.topic,
            method = %form.method,
            "Generating lesson plan"
        );

        // 3. Call and parse
        let plan = fetch_plan(self.ai_provider.as_ref(), request).await?;

        info!(title = %plan.title, steps = plan.step_count(), "Lesson plan generated");
        Ok(plan)
    }
}
