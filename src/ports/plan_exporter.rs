//! Plan Exporter Port - Lesson plan to downloadable document.
//!
//! Each exporter is an independent transform of one complete `LessonPlan`.
//! Exporters hold no state between calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::lesson_plan::LessonPlan;

/// Port for turning a lesson plan into a file.
#[async_trait]
pub trait PlanExporter: Send + Sync {
    /// The format this exporter produces.
    fn format(&self) -> ExportFormat;

    /// Export the plan.
    async fn export(&self, plan: &LessonPlan) -> Result<ExportedDocument, ExportError>;
}

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Word-processor document.
    Docx,
    /// Paginated snapshot of the rendered view.
    Pdf,
    /// Slide deck.
    Pptx,
}

impl ExportFormat {
    /// Get the MIME content type for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Pptx => "pptx",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docx" | "word" => Ok(ExportFormat::Docx),
            "pdf" => Ok(ExportFormat::Pdf),
            "pptx" | "slides" => Ok(ExportFormat::Pptx),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

const DEFAULT_BASE_FILENAME: &str = "giao-an";

/// Exported document with content and metadata.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    /// The exported content as bytes.
    pub content: Vec<u8>,
    /// The MIME content type.
    pub content_type: String,
    /// Suggested filename for download.
    pub filename: String,
    /// The format that was used.
    pub format: ExportFormat,
}

impl ExportedDocument {
    /// Creates a document named `<base_filename>.<ext>`.
    ///
    /// Path separators and characters reserved on common file systems are
    /// replaced with `_`; a blank base falls back to `giao-an`.
    pub fn new(content: Vec<u8>, format: ExportFormat, base_filename: &str) -> Self {
        let base: String = base_filename
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        let base = if base.is_empty() {
            DEFAULT_BASE_FILENAME.to_string()
        } else {
            base
        };

        Self {
            content,
            content_type: format.content_type().to_string(),
            filename: format!("{}.{}", base, format.extension()),
            format,
        }
    }
}

/// Errors that can occur during export.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// External converter is not available.
    #[error("Export service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Writing the document container failed.
    #[error("Document serialization failed: {0}")]
    Serialization(String),

    /// Conversion to PDF failed.
    #[error("PDF conversion failed: {0}")]
    PdfConversionFailed(String),

    #[error("Conversion timed out after {0} seconds")]
    Timeout(u64),
}

impl ExportError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    pub fn pdf_failed(message: impl Into<String>) -> Self {
        Self::PdfConversionFailed(message.into())
    }
}
