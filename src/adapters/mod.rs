//! Adapters - Implementations of port interfaces and the outer surfaces.
//!
//! - `ai` - Gemini client, scripted mock, and the stand-in used without a key
//! - `export` - Word, PDF and slide exporters
//! - `http` - axum page and JSON API
//! - `view` - HTML rendering of the plan and the page

pub mod ai;
pub mod export;
pub mod http;
pub mod view;
