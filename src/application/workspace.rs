//! PlanWorkspace - The single lesson plan slot and everything that acts on it.
//!
//! Holds the current plan, the error banner, the last submitted form and the
//! revision draft. Generation and revision each have their own in-flight gate;
//! exports read whatever plan is held when they start.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::lesson_plan::{FormValidationError, LessonPlan, LessonPlanFormData, PlanError};
use crate::ports::{ExportFormat, ExportedDocument, PlanExporter, ProviderInfo};

use super::handlers::{GeneratePlanHandler, RevisePlanCommand, RevisePlanHandler};

const GENERATE_FALLBACK_MESSAGE: &str = "Đã xảy ra lỗi khi tạo giáo án.";
const REVISE_FALLBACK_MESSAGE: &str = "Đã xảy ra lỗi khi cập nhật giáo án.";

/// Which gated operation is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Revise,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Generate => write!(f, "generation"),
            Operation::Revise => write!(f, "revision"),
        }
    }
}

/// Workspace operation failures.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Validation(#[from] FormValidationError),

    #[error("a {0} is already in progress")]
    Busy(Operation),

    #[error(transparent)]
    Plan(PlanError),
}

/// Read-only copy of the workspace state for rendering.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceSnapshot {
    pub plan: Option<LessonPlan>,
    pub error: Option<String>,
    pub form: LessonPlanFormData,
    pub feedback: String,
    pub is_generating: bool,
    pub is_revising: bool,
}

#[derive(Debug, Default)]
struct WorkspaceState {
    plan: Option<LessonPlan>,
    error: Option<String>,
    form: LessonPlanFormData,
    feedback: String,
}

/// Marks an operation in flight until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct PlanWorkspace {
    generator: GeneratePlanHandler,
    reviser: RevisePlanHandler,
    exporters: Vec<Arc<dyn PlanExporter>>,
    state: RwLock<WorkspaceState>,
    generating: AtomicBool,
    revising: AtomicBool,
}

impl PlanWorkspace {
    pub fn new(generator: GeneratePlanHandler, reviser: RevisePlanHandler) -> Self {
        Self {
            generator,
            reviser,
            exporters: Vec::new(),
            state: RwLock::new(WorkspaceState::default()),
            generating: AtomicBool::new(false),
            revising: AtomicBool::new(false),
        }
    }

    /// Registers an exporter. A later exporter for the same format wins.
    pub fn with_exporter(mut self, exporter: Arc<dyn PlanExporter>) -> Self {
        self.exporters.retain(|e| e.format() != exporter.format());
        self.exporters.push(exporter);
        self
    }

    /// Formats with a registered exporter.
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        self.exporters.iter().map(|e| e.format()).collect()
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.generator.provider_info()
    }

    /// Copies the current state.
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        WorkspaceSnapshot {
            plan: state.plan.clone(),
            error: state.error.clone(),
            form: state.form.clone(),
            feedback: state.feedback.clone(),
            is_generating: self.generating.load(Ordering::Acquire),
            is_revising: self.revising.load(Ordering::Acquire),
        }
    }

    /// The plan currently held, if any.
    pub fn current_plan(&self) -> Option<LessonPlan> {
        self.read(|state| state.plan.clone())
    }

    /// Generates a plan from the form and replaces the slot with it.
    ///
    /// The form is remembered even when rejected. Validation runs before the
    /// in-flight check, so an empty topic is reported while a request runs.
    pub async fn submit(&self, form: LessonPlanFormData) -> Result<LessonPlan, WorkspaceError> {
        self.write(|state| state.form = form.clone());

        if let Err(err) = form.validate() {
            self.write(|state| state.error = Some(err.to_string()));
            return Err(err.into());
        }

        let _in_flight =
            InFlight::acquire(&self.generating).ok_or(WorkspaceError::Busy(Operation::Generate))?;
        self.write(|state| state.error = None);

        match self.generator.handle(&form).await {
            Ok(plan) => {
                self.write(|state| state.plan = Some(plan.clone()));
                Ok(plan)
            }
            Err(err) => {
                warn!(error = %err, code = err.code(), "Lesson plan generation failed");
                let message = banner_message(&err, GENERATE_FALLBACK_MESSAGE);
                self.write(|state| state.error = Some(message));
                Err(WorkspaceError::Plan(err))
            }
        }
    }

    /// Revises the held plan with the given feedback.
    ///
    /// Returns `Ok(None)` without contacting the AI service when there is no
    /// plan or the feedback is blank. The draft is cleared only on success.
    pub async fn revise(&self, feedback: &str) -> Result<Option<LessonPlan>, WorkspaceError> {
        let current = self.write(|state| {
            state.feedback = feedback.to_string();
            state.plan.clone()
        });

        let Some(current) = current else {
            return Ok(None);
        };
        if feedback.trim().is_empty() {
            return Ok(None);
        }

        let _in_flight =
            InFlight::acquire(&self.revising).ok_or(WorkspaceError::Busy(Operation::Revise))?;
        self.write(|state| state.error = None);

        let cmd = RevisePlanCommand {
            current,
            feedback: feedback.to_string(),
        };

        match self.reviser.handle(cmd).await {
            Ok(plan) => {
                self.write(|state| {
                    state.plan = Some(plan.clone());
                    state.feedback.clear();
                });
                Ok(Some(plan))
            }
            Err(err) => {
                warn!(error = %err, code = err.code(), "Lesson plan revision failed");
                let message = banner_message(&err, REVISE_FALLBACK_MESSAGE);
                self.write(|state| state.error = Some(message));
                Err(WorkspaceError::Plan(err))
            }
        }
    }

    /// Exports the held plan.
    ///
    /// `None` when there is no plan, no exporter for the format, or the
    /// exporter failed. Failures are logged and otherwise invisible.
    pub async fn export(&self, format: ExportFormat) -> Option<ExportedDocument> {
        let plan = self.current_plan()?;

        let Some(exporter) = self.exporters.iter().find(|e| e.format() == format) else {
            warn!(%format, "No exporter registered");
            return None;
        };

        match exporter.export(&plan).await {
            Ok(document) => {
                info!(
                    %format,
                    filename = %document.filename,
                    bytes = document.content.len(),
                    "Lesson plan exported"
                );
                Some(document)
            }
            Err(err) => {
                warn!(%format, error = %err, "Lesson plan export failed");
                None
            }
        }
    }

    /// Discards the held plan and the revision draft.
    pub fn clear(&self) {
        self.write(|state| {
            state.plan = None;
            state.feedback.clear();
        });
    }

    /// Hides the error banner.
    pub fn dismiss_error(&self) {
        self.write(|state| state.error = None);
    }

    fn read<T>(&self, f: impl FnOnce(&WorkspaceState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut WorkspaceState) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

fn banner_message(err: &PlanError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::lesson_plan::fixtures::{orange_plan, orange_plan_json};
    use crate::domain::lesson_plan::ProcedureStep;
    use crate::ports::{AIProvider, ExportError};
    use async_trait::async_trait;
    use std::time::Duration;

    struct StubExporter {
        format: ExportFormat,
        fail: bool,
    }

    #[async_trait]
    impl PlanExporter for StubExporter {
        fn format(&self) -> ExportFormat {
            self.format
        }

        async fn export(&self, plan: &LessonPlan) -> Result<ExportedDocument, ExportError> {
            if self.fail {
                return Err(ExportError::pdf_failed("wkhtmltopdf not found"));
            }
            Ok(ExportedDocument::new(
                plan.title.as_bytes().to_vec(),
                self.format,
                &plan.title,
            ))
        }
    }

    fn workspace(mock: &MockAIProvider) -> PlanWorkspace {
        let ai: Arc<dyn AIProvider> = Arc::new(mock.clone());
        PlanWorkspace::new(
            GeneratePlanHandler::new(ai.clone()),
            RevisePlanHandler::new(ai),
        )
        .with_exporter(Arc::new(StubExporter {
            format: ExportFormat::Docx,
            fail: false,
        }))
        .with_exporter(Arc::new(StubExporter {
            format: ExportFormat::Pdf,
            fail: true,
        }))
    }

    fn orange_form() -> LessonPlanFormData {
        LessonPlanFormData::with_topic("Khám phá quả cam")
    }

    #[tokio::test]
    async fn orange_scenario_produces_complete_plan() {
        let mock = MockAIProvider::new().with_response(orange_plan_json());
        let ws = workspace(&mock);

        let plan = ws.submit(orange_form()).await.unwrap();

        assert!(!plan.title.is_empty());
        assert!(!plan.objectives.knowledge.is_empty());
        assert!(!plan.objectives.skills.is_empty());
        assert!(!plan.objectives.attitude.is_empty());
        let step = &plan.procedure[0];
        assert!(!step.step.is_empty() && !step.teacher_activity.is_empty());
        assert_eq!(ws.current_plan(), Some(plan));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn successful_generation_replaces_plan_in_full() {
        let mut second = orange_plan();
        second.title = "Bé với nước".to_string();
        second.procedure = vec![ProcedureStep::new("Một", "a", "b")];
        let mock = MockAIProvider::new()
            .with_response(orange_plan_json())
            .with_response(serde_json::to_string(&second).unwrap());
        let ws = workspace(&mock);

        ws.submit(orange_form()).await.unwrap();
        ws.submit(LessonPlanFormData::with_topic("Bé với nước"))
            .await
            .unwrap();

        assert_eq!(ws.current_plan(), Some(second));
    }

    #[tokio::test]
    async fn empty_topic_sets_message_without_request() {
        let mock = MockAIProvider::new();
        let ws = workspace(&mock);

        let result = ws.submit(LessonPlanFormData::default()).await;

        assert!(matches!(result, Err(WorkspaceError::Validation(_))));
        assert_eq!(mock.call_count(), 0);
        assert_eq!(
            ws.snapshot().error.as_deref(),
            Some("Vui lòng nhập Chủ đề/Tên bài")
        );
    }

    #[tokio::test]
    async fn empty_reply_sets_error_and_keeps_plan() {
        let mock = MockAIProvider::new()
            .with_response(orange_plan_json())
            .with_empty_response();
        let ws = workspace(&mock);
        ws.submit(orange_form()).await.unwrap();

        let result = ws.submit(LessonPlanFormData::with_topic("Lá cây")).await;

        assert!(matches!(
            result,
            Err(WorkspaceError::Plan(PlanError::EmptyResponse))
        ));
        let snapshot = ws.snapshot();
        assert_eq!(snapshot.plan, Some(orange_plan()));
        assert_eq!(snapshot.error.as_deref(), Some("No response from Gemini"));
        assert!(!snapshot.is_generating);
    }

    #[tokio::test]
    async fn new_submission_clears_previous_error() {
        let mock = MockAIProvider::new()
            .with_error(MockError::Network {
                message: "reset".to_string(),
            })
            .with_response(orange_plan_json());
        let ws = workspace(&mock);

        ws.submit(orange_form()).await.unwrap_err();
        assert!(ws.snapshot().error.is_some());

        ws.submit(orange_form()).await.unwrap();
        assert!(ws.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn submitted_form_is_remembered() {
        let mock = MockAIProvider::new().with_response(orange_plan_json());
        let ws = workspace(&mock);
        let mut form = orange_form();
        form.teacher = "Cô Lan".to_string();

        ws.submit(form.clone()).await.unwrap();

        assert_eq!(ws.snapshot().form, form);
    }

    #[tokio::test]
    async fn overlapping_generation_is_rejected() {
        let mock = MockAIProvider::new()
            .with_response(orange_plan_json())
            .with_delay(Duration::from_millis(200));
        let ws = Arc::new(workspace(&mock));

        let first = {
            let ws = ws.clone();
            tokio::spawn(async move { ws.submit(orange_form()).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(ws.snapshot().is_generating);

        let second = ws.submit(orange_form()).await;

        assert!(matches!(
            second,
            Err(WorkspaceError::Busy(Operation::Generate))
        ));
        assert!(first.await.unwrap().is_ok());
        assert!(!ws.snapshot().is_generating);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn revise_without_plan_is_noop() {
        let mock = MockAIProvider::new();
        let ws = workspace(&mock);

        let result = ws.revise("Thêm trò chơi vận động").await.unwrap();

        assert!(result.is_none());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn revise_with_blank_feedback_is_noop() {
        let mock = MockAIProvider::new().with_response(orange_plan_json());
        let ws = workspace(&mock);
        ws.submit(orange_form()).await.unwrap();

        let result = ws.revise("   ").await.unwrap();

        assert!(result.is_none());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn successful_revision_replaces_plan_and_clears_draft() {
        let mut revised = orange_plan();
        revised.procedure.push(ProcedureStep::new(
            "Trò chơi vận động",
            "Cô tổ chức",
            "Trẻ chơi",
        ));
        let mock = MockAIProvider::new()
            .with_response(orange_plan_json())
            .with_response(serde_json::to_string(&revised).unwrap());
        let ws = workspace(&mock);
        ws.submit(orange_form()).await.unwrap();

        let plan = ws.revise("Thêm trò chơi vận động").await.unwrap();

        assert_eq!(plan, Some(revised.clone()));
        let snapshot = ws.snapshot();
        assert_eq!(snapshot.plan, Some(revised));
        assert!(snapshot.feedback.is_empty());
    }

    #[tokio::test]
    async fn failed_revision_keeps_plan_and_draft() {
        let mock = MockAIProvider::new()
            .with_response(orange_plan_json())
            .with_response("not json");
        let ws = workspace(&mock);
        ws.submit(orange_form()).await.unwrap();

        let result = ws.revise("ngắn hơn").await;

        assert!(matches!(
            result,
            Err(WorkspaceError::Plan(PlanError::Parse(_)))
        ));
        let snapshot = ws.snapshot();
        assert_eq!(snapshot.plan, Some(orange_plan()));
        assert_eq!(snapshot.feedback, "ngắn hơn");
        assert!(snapshot.error.is_some());
    }

    #[tokio::test]
    async fn export_runs_while_revision_in_flight() {
        let mock = MockAIProvider::new()
            .with_response(orange_plan_json())
            .with_response(orange_plan_json())
            .with_delay(Duration::from_millis(200));
        let ws_slow = Arc::new(workspace(&mock));
        ws_slow.submit(orange_form()).await.unwrap();
        let revision = {
            let ws = ws_slow.clone();
            tokio::spawn(async move { ws.revise("thêm bài hát").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(ws_slow.snapshot().is_revising);

        let document = ws_slow.export(ExportFormat::Docx).await;

        assert!(document.is_some());
        assert!(revision.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn export_without_plan_is_noop() {
        let ws = workspace(&MockAIProvider::new());

        assert!(ws.export(ExportFormat::Docx).await.is_none());
        assert!(ws.export(ExportFormat::Pdf).await.is_none());
        assert!(ws.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn export_failure_is_silent() {
        let mock = MockAIProvider::new().with_response(orange_plan_json());
        let ws = workspace(&mock);
        ws.submit(orange_form()).await.unwrap();

        assert!(ws.export(ExportFormat::Pdf).await.is_none());
        assert!(ws.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn export_without_registered_exporter_is_noop() {
        let mock = MockAIProvider::new().with_response(orange_plan_json());
        let ws = workspace(&mock);
        ws.submit(orange_form()).await.unwrap();

        assert!(ws.export(ExportFormat::Pptx).await.is_none());
    }

    #[tokio::test]
    async fn export_names_file_after_title() {
        let mock = MockAIProvider::new().with_response(orange_plan_json());
        let ws = workspace(&mock);
        ws.submit(orange_form()).await.unwrap();

        let document = ws.export(ExportFormat::Docx).await.unwrap();

        assert_eq!(document.filename, "Khám phá quả cam.docx");
    }

    #[tokio::test]
    async fn clear_and_dismiss() {
        let mock = MockAIProvider::new().with_response(orange_plan_json());
        let ws = workspace(&mock);
        ws.submit(LessonPlanFormData::default()).await.unwrap_err();
        ws.submit(orange_form()).await.unwrap();

        ws.clear();
        assert!(ws.current_plan().is_none());

        ws.submit(LessonPlanFormData::default()).await.unwrap_err();
        ws.dismiss_error();
        assert!(ws.snapshot().error.is_none());
    }

    #[test]
    fn later_exporter_replaces_earlier() {
        let ws = workspace(&MockAIProvider::new()).with_exporter(Arc::new(StubExporter {
            format: ExportFormat::Pdf,
            fail: false,
        }));
        assert_eq!(ws.export_formats().len(), 2);
    }
}
