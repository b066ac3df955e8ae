//! Stand-in provider used when no Gemini client could be constructed.
//!
//! The server still starts so the form and presentation work; every
//! generation or revision fails with the construction error.

use async_trait::async_trait;

use crate::ports::{AIError, AIProvider, ProviderInfo, StructuredRequest, StructuredResponse};

pub struct UnconfiguredProvider {
    model: String,
    missing_key: bool,
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(model: impl Into<String>, error: &AIError) -> Self {
        Self {
            model: model.into(),
            missing_key: matches!(error, AIError::AuthenticationFailed),
            reason: error.to_string(),
        }
    }
}

#[async_trait]
impl AIProvider for UnconfiguredProvider {
    async fn generate_structured(
        &self,
        _request: StructuredRequest,
    ) -> Result<StructuredResponse, AIError> {
        if self.missing_key {
            return Err(AIError::AuthenticationFailed);
        }
        Err(AIError::unavailable(self.reason.clone()))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("unconfigured", &self.model)
    }
}
