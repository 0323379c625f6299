//! Architect client module for Garden Studio
//!
//! Provides feature detection, design generation and advisory chat against
//! a hosted multimodal model.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::ArchitectClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{
    Candidate, ConsultRequest, Content, DesignRequest, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, InlineData, Part, PromptFeedback, UsageMetadata,
};

use crate::config::LlmConfig;
use crate::prompts::PromptLoader;

/// Create an architect client based on the provider specified in config
///
/// Supports the "gemini" provider.
pub fn create_client(config: &LlmConfig, prompts: Arc<PromptLoader>) -> Result<Arc<dyn ArchitectClient>, LlmError> {
    debug!(provider = %config.provider, "create_client: called");
    match config.provider.as_str() {
        "gemini" => {
            debug!("create_client: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(config, prompts)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown model provider: '{}'. Supported: gemini",
                other
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };
        let result = create_client(&config, Arc::new(PromptLoader::embedded_only()));
        assert!(matches!(result, Err(LlmError::InvalidResponse(msg)) if msg.contains("openai")));
    }

    #[test]
    fn test_create_client_missing_key() {
        let config = LlmConfig {
            api_key_env: "GARDENSTUDIO_UNSET_KEY_FOR_TEST".to_string(),
            ..Default::default()
        };
        let result = create_client(&config, Arc::new(PromptLoader::embedded_only()));
        assert!(matches!(result, Err(LlmError::MissingApiKey(var)) if var == "GARDENSTUDIO_UNSET_KEY_FOR_TEST"));
    }
}
