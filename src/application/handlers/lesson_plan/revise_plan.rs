//! RevisePlanHandler - Re-emits a whole lesson plan with feedback applied.

use std::sync::Arc;

use tracing::info;

use crate::domain::lesson_plan::{prompts, LessonPlan, PlanError};
use crate::ports::AIProvider;

use super::plan_request::{fetch_plan, plan_request, DEFAULT_TEMPERATURE};

/// Command to revise a plan.
#[derive(Debug, Clone)]
pub struct RevisePlanCommand {
    pub current: LessonPlan,
    pub feedback: String,
}

/// Handler for revising a lesson plan.
///
/// The model returns a complete replacement; nothing is merged.
pub struct RevisePlanHandler {
    ai_provider: Arc<dyn AIProvider>,
    temperature: f32,
}

impl RevisePlanHandler {
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

    pub async fn handle(&self, cmd: RevisePlanCommand) -> Result<LessonPlan, PlanError> {
        let request = plan_request(
            prompts::revision_prompt(&cmd.current, &cmd.feedback),
            self.temperature,
        );
        info!(
            trace_id = %request.trace_id,
            title = %cmd.current.title,
            feedback_len = cmd.feedback.len(),
            "Revising lesson plan"
        );

        let plan = fetch_plan(self.ai_provider.as_ref(), request).await?;

        info!(title = %plan.title, steps = plan.step_count(), "Lesson plan revised");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::lesson_plan::fixtures::{orange_plan, orange_plan_json};
    use crate::domain::lesson_plan::ProcedureStep;

    fn five_step_plan() -> LessonPlan {
        let mut plan = orange_plan();
        plan.procedure = (1..=5)
            .map(|n| ProcedureStep::new(format!("Bước {}", n), "Cô hướng dẫn", "Trẻ thực hiện"))
            .collect();
        plan
    }

    #[tokio::test]
    async fn revision_embeds_current_plan_and_feedback() {
        let mock = MockAIProvider::new().with_response(orange_plan_json());
        let handler = RevisePlanHandler::new(Arc::new(mock.clone()));

        handler
            .handle(RevisePlanCommand {
                current: orange_plan(),
                feedback: "Thêm trò chơi vận động".to_string(),
            })
            .await
            .unwrap();

        let call = &mock.get_calls()[0];
        assert!(call.prompt.contains("\"title\": \"Khám phá quả cam\""));
        assert!(call.prompt.contains("\"Thêm trò chơi vận động\""));
        assert_eq!(call.response_schema["type"], "OBJECT");
        assert_eq!(call.temperature, Some(0.7));
    }

    #[tokio::test]
    async fn revision_of_five_step_plan_is_structurally_valid() {
        let mut revised = five_step_plan();
        revised.procedure.push(ProcedureStep::new(
            "Trò chơi vận động",
            "Cô tổ chức trò chơi \"Chuyền cam\"",
            "Trẻ chơi theo nhóm",
        ));
        let mock =
            MockAIProvider::new().with_response(serde_json::to_string(&revised).unwrap());
        let handler = RevisePlanHandler::new(Arc::new(mock));

        let plan = handler
            .handle(RevisePlanCommand {
                current: five_step_plan(),
                feedback: "Thêm trò chơi vận động".to_string(),
            })
            .await
            .unwrap();

        assert!(!plan.title.is_empty());
        assert!(!plan.procedure.is_empty());
        assert!(plan.procedure.iter().all(|s| !s.step.is_empty()));
    }

    #[tokio::test]
    async fn revision_failure_surfaces_error() {
        let mock = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "overloaded".to_string(),
        });
        let handler = RevisePlanHandler::new(Arc::new(mock));

        let result = handler
            .handle(RevisePlanCommand {
                current: orange_plan(),
                feedback: "ngắn hơn".to_string(),
            })
            .await;

        assert!(matches!(result, Err(PlanError::Provider(_))));
    }
}
