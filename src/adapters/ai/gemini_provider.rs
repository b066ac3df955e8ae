//! Gemini Provider - Implementation of AIProvider for Google's Generative Language API.
//!
//! Sends one `generateContent` call per request with a system instruction,
//! a JSON response schema and a temperature. No retries and no client-side
//! timeout: the caller waits for whatever the service returns.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-3.1-pro-preview");
//!
//! let provider = GeminiProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AiConfig;
use crate::ports::{
    AIError, AIProvider, FinishReason, ProviderInfo, StructuredRequest, StructuredResponse,
    TokenUsage,
};

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-3.1-pro-preview").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-3.1-pro-preview".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    /// Builds provider configuration from application settings.
    ///
    /// Fails with `AuthenticationFailed` when no key is configured.
    pub fn from_ai_config(config: &AiConfig) -> Result<Self, AIError> {
        let key = config
            .gemini_api_key
            .as_ref()
            .map(|k| k.expose_secret().clone())
            .unwrap_or_default();

        Ok(Self::new(key)
            .with_model(&config.model)
            .with_base_url(&config.base_url))
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    ///
    /// An empty API key is rejected here, before any request is attempted.
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        if config.api_key().is_empty() {
            return Err(AIError::AuthenticationFailed);
        }

        let client = Client::builder()
            .build()
            .map_err(|e| AIError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Converts our request to Gemini's format.
    fn to_gemini_request(request: &StructuredRequest) -> GeminiRequest {
        GeminiRequest {
            system_instruction: request.system_instruction.as_ref().map(|text| {
                GeminiContent {
                    role: None,
                    parts: vec![GeminiPart { text: text.clone() }],
                }
            }),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: request.response_mime_type.clone(),
                response_schema: request.response_schema.clone(),
                temperature: request.temperature,
            },
        }
    }

    /// Sends a request.
    async fn send_request(&self, request: &StructuredRequest) -> Result<Response, AIError> {
        let body = Self::to_gemini_request(request);

        self.client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(Self::error_for_status(status.as_u16(), error_body))
    }

    fn error_for_status(status: u16, error_body: String) -> AIError {
        let message = Self::error_message(&error_body).unwrap_or(error_body);

        match status {
            401 | 403 => AIError::AuthenticationFailed,
            429 => AIError::rate_limited(message),
            400 | 404 => AIError::InvalidRequest(message),
            500..=599 => AIError::unavailable(format!("Server error {}: {}", status, message)),
            _ => AIError::network(format!("Unexpected status {}: {}", status, message)),
        }
    }

    /// Extracts `error.message` from a Google API error envelope.
    fn error_message(error_body: &str) -> Option<String> {
        serde_json::from_str::<Value>(error_body)
            .ok()?
            .get("error")?
            .get("message")?
            .as_str()
            .map(str::to_string)
    }

    /// Converts a decoded response into our format.
    ///
    /// The text is the concatenation of every non-thought part of the first
    /// candidate. A response without candidates or text yields `text: None`.
    fn from_gemini_response(&self, response: GeminiResponse) -> StructuredResponse {
        let candidate = response.candidates.into_iter().next();

        let finish_reason = match candidate
            .as_ref()
            .and_then(|c| c.finish_reason.as_deref())
        {
            None | Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
                FinishReason::ContentFilter
            }
            Some(_) => FinishReason::Other,
        };

        let text = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought.unwrap_or(false))
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty());

        let usage = response
            .usage_metadata
            .map(|u| {
                TokenUsage::new(
                    u.prompt_token_count.unwrap_or(0),
                    u.candidates_token_count.unwrap_or(0),
                )
            })
            .unwrap_or_default();

        StructuredResponse {
            text,
            model: response
                .model_version
                .unwrap_or_else(|| self.config.model.clone()),
            finish_reason,
            usage,
        }
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<StructuredResponse, AIError> {
        debug!(
            trace_id = %request.trace_id,
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            "Sending generateContent request"
        );

        let response = self.send_request(&request).await?;
        let response = Self::handle_response_status(response).await.map_err(|e| {
            warn!(trace_id = %request.trace_id, error = %e, "Gemini request failed");
            e
        })?;

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        let result = self.from_gemini_response(gemini_response);

        info!(
            trace_id = %request.trace_id,
            model = %result.model,
            finish_reason = ?result.finish_reason,
            prompt_tokens = result.usage.prompt_tokens,
            completion_tokens = result.usage.completion_tokens,
            has_text = result.text.is_some(),
            "Gemini response received"
        );

        Ok(result)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(GeminiConfig::new("test-key")).unwrap()
    }

    #[test]
    fn config_builder_works() {
        let config = GeminiConfig::new("test-key")
            .with_model("gemini-2.5-flash")
            .with_base_url("https://proxy.example.com/v1beta/");

        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.base_url, "https://proxy.example.com/v1beta");
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn empty_key_fails_at_construction() {
        let result = GeminiProvider::new(GeminiConfig::new(""));
        assert!(matches!(result, Err(AIError::AuthenticationFailed)));
    }

    #[test]
    fn missing_configured_key_fails_at_construction() {
        let config = GeminiConfig::from_ai_config(&AiConfig::default()).unwrap();
        assert!(matches!(
            GeminiProvider::new(config),
            Err(AIError::AuthenticationFailed)
        ));
    }

    #[test]
    fn generate_url_includes_model() {
        assert_eq!(
            provider().generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3.1-pro-preview:generateContent"
        );
    }

    #[test]
    fn request_serializes_in_gemini_shape() {
        let request = StructuredRequest::new("Soạn giáo án", json!({"type": "OBJECT"}))
            .with_system_instruction("Bạn là chuyên gia")
            .with_temperature(0.7);

        let body = serde_json::to_value(GeminiProvider::to_gemini_request(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Bạn là chuyên gia");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Soạn giáo án");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn request_without_system_instruction_omits_it() {
        let request = StructuredRequest::new("x", json!({}));
        let body = serde_json::to_value(GeminiProvider::to_gemini_request(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn response_text_joins_parts_and_skips_thoughts() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "{\"title\":"},
                    {"text": "\"A\"}"}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 30, "totalTokenCount": 42},
            "modelVersion": "gemini-3.1-pro-preview-001"
        });
        let decoded: GeminiResponse = serde_json::from_value(raw).unwrap();

        let response = provider().from_gemini_response(decoded);

        assert_eq!(response.text.as_deref(), Some("{\"title\":\"A\"}"));
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.total_tokens, 42);
        assert_eq!(response.model, "gemini-3.1-pro-preview-001");
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let raw = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let decoded: GeminiResponse = serde_json::from_value(raw).unwrap();

        let response = provider().from_gemini_response(decoded);

        assert!(response.text.is_none());
        assert_eq!(response.model, "gemini-3.1-pro-preview");
    }

    #[test]
    fn safety_finish_maps_to_content_filter() {
        let raw = json!({"candidates": [{"finishReason": "SAFETY"}]});
        let decoded: GeminiResponse = serde_json::from_value(raw).unwrap();

        let response = provider().from_gemini_response(decoded);

        assert!(response.text.is_none());
        assert_eq!(response.finish_reason, FinishReason::ContentFilter);
    }

    #[test]
    fn max_tokens_maps_to_length() {
        let raw = json!({"candidates": [{
            "content": {"parts": [{"text": "{\"title\": \"cut"}]},
            "finishReason": "MAX_TOKENS"
        }]});
        let decoded: GeminiResponse = serde_json::from_value(raw).unwrap();

        let response = provider().from_gemini_response(decoded);
        assert_eq!(response.finish_reason, FinishReason::Length);
    }

    #[test]
    fn status_errors_map_to_ai_errors() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        match GeminiProvider::error_for_status(429, body.to_string()) {
            AIError::RateLimited { message } => assert_eq!(message, "Resource has been exhausted"),
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(matches!(
            GeminiProvider::error_for_status(403, String::new()),
            AIError::AuthenticationFailed
        ));
        assert!(matches!(
            GeminiProvider::error_for_status(400, "bad schema".to_string()),
            AIError::InvalidRequest(ref m) if m == "bad schema"
        ));
        assert!(matches!(
            GeminiProvider::error_for_status(503, String::new()),
            AIError::Unavailable { .. }
        ));
        assert!(matches!(
            GeminiProvider::error_for_status(418, String::new()),
            AIError::Network(_)
        ));
    }

    #[test]
    fn provider_info_reports_model() {
        let info = provider().provider_info();
        assert_eq!(info.name, "gemini");
        assert_eq!(info.model, "gemini-3.1-pro-preview");
    }
}
