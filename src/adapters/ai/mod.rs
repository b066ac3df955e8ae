//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `GeminiProvider` - Google Gemini `generateContent` with a JSON response schema
//! - `MockAIProvider` - Configurable mock for testing
//! - `UnconfiguredProvider` - Fails every call when the Gemini client could not be built

mod gemini_provider;
mod mock_provider;
mod unconfigured_provider;

pub use gemini_provider::{GeminiConfig, GeminiProvider};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use unconfigured_provider::UnconfiguredProvider;
