//! HTML views.
//!
//! - `plan_view` - lesson plan as Markdown and as an HTML region
//! - `page` - the full server-rendered page

mod page;
mod plan_view;

pub use page::render_page;
pub use plan_view::{
    render_markdown, render_plan_body, render_plan_region, render_standalone_document,
    PLAN_REGION_ID,
};

/// Escape HTML special characters.
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
