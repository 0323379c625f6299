//! Architect client error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during model calls
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("The AI Architect could not generate a design. Please try a different photo or description.")]
    NoDesign,

    #[error("No image data found in the response.")]
    NoImageData,

    #[error("API key not found. Set the {0} environment variable.")]
    MissingApiKey(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status == 408 || *status >= 500,
            LlmError::Network(_) => true,
            LlmError::InvalidResponse(_)
            | LlmError::NoDesign
            | LlmError::NoImageData
            | LlmError::MissingApiKey(_)
            | LlmError::Prompt(_)
            | LlmError::Json(_) => false,
        }
    }

    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rate_limit() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(60),
        };
        assert!(err.is_rate_limit());

        let err = LlmError::ApiError {
            status: 500,
            message: "Server error".to_string(),
        };
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn test_is_retryable() {
        assert!(
            LlmError::ApiError {
                status: 503,
                message: "Unavailable".to_string()
            }
            .is_retryable()
        );

        // 4xx errors should not be retryable
        assert!(
            !LlmError::ApiError {
                status: 400,
                message: "Bad request".to_string()
            }
            .is_retryable()
        );

        // A response without an image will not improve on retry
        assert!(!LlmError::NoImageData.is_retryable());
        assert!(!LlmError::NoDesign.is_retryable());
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(LlmError::NoImageData.to_string(), "No image data found in the response.");
        assert!(LlmError::NoDesign.to_string().starts_with("The AI Architect could not generate a design"));
        assert!(
            LlmError::MissingApiKey("GEMINI_API_KEY".to_string())
                .to_string()
                .contains("GEMINI_API_KEY")
        );
    }

    #[test]
    fn test_retry_after() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(42),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(42)));
        assert_eq!(LlmError::NoDesign.retry_after(), None);
    }
}
