//! Lesson plan command handlers.

mod generate_plan;
mod plan_request;
mod revise_plan;

pub use generate_plan::GeneratePlanHandler;
pub use plan_request::DEFAULT_TEMPERATURE;
pub use revise_plan::{RevisePlanCommand, RevisePlanHandler};
