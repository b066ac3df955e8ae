//! Application layer - Handlers and the plan workspace.
//!
//! Handlers turn a form or a revision request into a lesson plan through the
//! AI port. The workspace owns the single plan slot and gates concurrent use.

pub mod handlers;
mod workspace;

pub use handlers::{GeneratePlanHandler, RevisePlanCommand, RevisePlanHandler};
pub use workspace::{Operation, PlanWorkspace, WorkspaceError, WorkspaceSnapshot};
