//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling Gemini.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Simulated delays for overlapping-request tests
//! - Error injection
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response(r#"{"title": "..."}"#)
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = provider.generate_structured(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, FinishReason, ProviderInfo, StructuredRequest, StructuredResponse,
    TokenUsage,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<StructuredRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return text.
    Success {
        text: String,
        finish_reason: FinishReason,
    },
    /// Return a response with no text at all.
    Empty,
    /// Return an error.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { message: String },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    InvalidRequest { message: String },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { message } => AIError::rate_limited(message),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::InvalidRequest { message } => AIError::InvalidRequest(message),
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-gemini"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            text: text.into(),
            finish_reason: FinishReason::Stop,
        })
    }

    /// Adds a response that carries no text.
    pub fn with_empty_response(self) -> Self {
        self.push(MockResponse::Empty)
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<StructuredRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Gets the next response. An exhausted queue behaves like an empty reply.
    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockResponse::Empty)
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<StructuredResponse, AIError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success {
                text,
                finish_reason,
            } => Ok(StructuredResponse {
                usage: TokenUsage::new(10, (text.len() / 4) as u32),
                text: Some(text),
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Empty => Ok(StructuredResponse {
                text: None,
                model: self.info.model.clone(),
                finish_reason: FinishReason::Other,
                usage: TokenUsage::default(),
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_request() -> StructuredRequest {
        StructuredRequest::new("Hello", json!({"type": "OBJECT"}))
    }

    #[tokio::test]
    async fn mock_provider_returns_configured_response() {
        let provider = MockAIProvider::new().with_response("{}");

        let response = provider.generate_structured(test_request()).await.unwrap();

        assert_eq!(response.text.as_deref(), Some("{}"));
        assert_eq!(response.model, "mock-gemini");
        assert_eq!(response.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn mock_provider_returns_responses_in_order() {
        let provider = MockAIProvider::new()
            .with_response("First")
            .with_response("Second");

        let r1 = provider.generate_structured(test_request()).await.unwrap();
        let r2 = provider.generate_structured(test_request()).await.unwrap();

        assert_eq!(r1.text.as_deref(), Some("First"));
        assert_eq!(r2.text.as_deref(), Some("Second"));
    }

    #[tokio::test]
    async fn mock_provider_is_empty_after_exhausted() {
        let provider = MockAIProvider::new().with_response("Only one");

        provider.generate_structured(test_request()).await.unwrap();
        let r2 = provider.generate_structured(test_request()).await.unwrap();

        assert!(r2.text.is_none());
    }

    #[tokio::test]
    async fn mock_provider_returns_configured_error() {
        let provider = MockAIProvider::new().with_error(MockError::RateLimited {
            message: "quota".to_string(),
        });

        let err = provider
            .generate_structured(test_request())
            .await
            .unwrap_err();

        assert!(matches!(err, AIError::RateLimited { ref message } if message == "quota"));
    }

    #[tokio::test]
    async fn mock_provider_tracks_calls() {
        let provider = MockAIProvider::new().with_response("a").with_response("b");

        assert_eq!(provider.call_count(), 0);
        provider.generate_structured(test_request()).await.unwrap();
        provider.generate_structured(test_request()).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.get_calls()[0].prompt, "Hello");

        provider.clear_calls();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn mock_provider_respects_delay() {
        let provider = MockAIProvider::new()
            .with_response("late")
            .with_delay(Duration::from_millis(50));

        let start = std::time::Instant::now();
        provider.generate_structured(test_request()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn mock_error_converts_to_ai_error() {
        let err: AIError = MockError::AuthenticationFailed.into();
        assert!(matches!(err, AIError::AuthenticationFailed));

        let err: AIError = MockError::Unavailable {
            message: "down".to_string(),
        }
        .into();
        assert!(matches!(err, AIError::Unavailable { .. }));
    }
}
