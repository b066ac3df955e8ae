//! Lesson plan error types.

use thiserror::Error;

use crate::ports::AIError;

use super::form::MISSING_TOPIC_MESSAGE;

/// Form submission rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormValidationError {
    #[error("{}", MISSING_TOPIC_MESSAGE)]
    MissingTopic,
}

/// Failure of a generation or revision call.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The form was rejected; no request was sent.
    #[error(transparent)]
    Validation(#[from] FormValidationError),

    /// The AI service answered without any text.
    #[error("No response from Gemini")]
    EmptyResponse,

    /// The AI service text is not a well-formed lesson plan.
    #[error("Không đọc được giáo án trả về: {0}")]
    Parse(String),

    /// Transport or service failure below the adapter.
    #[error(transparent)]
    Provider(#[from] AIError),
}

impl PlanError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::Validation(_) => "VALIDATION_FAILED",
            PlanError::EmptyResponse => "EMPTY_RESPONSE",
            PlanError::Parse(_) => "PARSE_ERROR",
            PlanError::Provider(_) => "AI_PROVIDER_ERROR",
        }
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_displays_form_message() {
        let err = PlanError::from(FormValidationError::MissingTopic);
        assert_eq!(err.to_string(), "Vui lòng nhập Chủ đề/Tên bài");
        assert_eq!(err.code(), "VALIDATION_FAILED");
    }

    #[test]
    fn provider_error_is_not_transformed() {
        let err = PlanError::from(AIError::AuthenticationFailed);
        assert_eq!(err.to_string(), "authentication failed");
        assert!(matches!(
            err,
            PlanError::Provider(AIError::AuthenticationFailed)
        ));
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = PlanError::from(json_err);
        assert_eq!(err.code(), "PARSE_ERROR");
    }
}
