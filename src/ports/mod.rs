//! Ports - Interfaces to the outside world.
//!
//! - `ai_provider` - structured text generation
//! - `plan_exporter` - lesson plan to office document

mod ai_provider;
mod plan_exporter;

pub use ai_provider::{
    AIError, AIProvider, FinishReason, ProviderInfo, StructuredRequest, StructuredResponse,
    TokenUsage,
};
pub use plan_exporter::{ExportError, ExportFormat, ExportedDocument, PlanExporter};
