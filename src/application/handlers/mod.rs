//! Application handlers.
//!
//! Command handlers that orchestrate domain operations against ports.

pub mod lesson_plan;

pub use lesson_plan::{
    GeneratePlanHandler, RevisePlanCommand, RevisePlanHandler, DEFAULT_TEMPERATURE,
};
