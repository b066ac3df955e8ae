//! Document exporters.
//!
//! - `docx_exporter` - Word document
//! - `pdf_exporter` - printable snapshot through wkhtmltopdf
//! - `pptx_exporter` - slide deck
//!
//! `ooxml` holds the zip and XML plumbing shared by Word and slides.

mod docx_exporter;
mod ooxml;
mod pdf_exporter;
mod pptx_exporter;

pub use docx_exporter::DocxExporter;
pub use pdf_exporter::PdfExporter;
pub use pptx_exporter::{build_slides, emu, Align, Anchor, PptxExporter, Slide, TextBox};
