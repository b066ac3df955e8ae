//! AI Provider Port - Interface for structured text generation.
//!
//! The application needs exactly one operation from a generative model:
//! send a prompt with a system instruction, a response schema and a sampling
//! temperature, and get the raw text back. Generation and revision both go
//! through it unchanged.
//!
//! # Example
//!
//! ```ignore
//! let request = StructuredRequest::new(prompt, lesson_plan_schema().clone())
//!     .with_system_instruction(SYSTEM_INSTRUCTION)
//!     .with_temperature(0.7);
//!
//! let response = provider.generate_structured(request).await?;
//! let text = response.text.unwrap_or_default();
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Port for structured generation against an AI/LLM provider.
///
/// Implementations translate between the provider's API and these types.
/// They perform a single attempt per call.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generate text constrained to the request's response schema.
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<StructuredResponse, AIError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for schema-constrained generation.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// User prompt.
    pub prompt: String,
    /// System instruction guiding model behavior.
    pub system_instruction: Option<String>,
    /// Response schema the output must follow.
    pub response_schema: Value,
    /// MIME type requested for the response body.
    pub response_mime_type: String,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Trace ID for log correlation.
    pub trace_id: String,
}

impl StructuredRequest {
    /// Creates a JSON-constrained request with a fresh trace id.
    pub fn new(prompt: impl Into<String>, response_schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            response_schema,
            response_mime_type: "application/json".to_string(),
            temperature: None,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Response from structured generation.
#[derive(Debug, Clone)]
pub struct StructuredResponse {
    /// Generated text; `None` when the provider returned no text at all.
    pub text: Option<String>,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
    /// Token usage reported by the provider.
    pub usage: TokenUsage,
}

impl StructuredResponse {
    /// Creates a response carrying text.
    pub fn text(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            model: model.into(),
            finish_reason: FinishReason::Stop,
            usage: TokenUsage::default(),
        }
    }

    /// Returns the text if the provider produced any non-empty output.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit the output token limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
    /// Anything else the provider reports.
    Other,
}

/// Provider information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "gemini").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    /// Rate limited or quota exhausted.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// Content was blocked by the provider.
    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key missing or rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Provider envelope could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request rejected as invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AIError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
