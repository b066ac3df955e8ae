//! Lesson plan domain: the form snapshot, the structured plan record, the
//! prompts built from them, and the response schema.

mod errors;
mod form;
mod plan;
pub mod prompts;
mod schema;

pub use errors::{FormValidationError, PlanError};
pub use form::{
    LessonPlanFormData, AGE_GROUPS, DEVELOPMENT_FIELDS, METHODS, MISSING_TOPIC_MESSAGE,
};
pub use plan::{LessonPlan, Objectives, Preparation, ProcedureStep};
pub use schema::lesson_plan_schema;

#[cfg(test)]
pub(crate) use plan::fixtures;
