//! Domain layer.

pub mod lesson_plan;
