//! Gemini API client implementation
//!
//! Implements the ArchitectClient trait on top of the Gemini
//! `generateContent` endpoint: a vision model for feature detection, an
//! image model for designs and a text model for advice.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    ArchitectClient, ConsultRequest, Content, DesignRequest, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, LlmError, Part,
};
use crate::config::LlmConfig;
use crate::domain::EncodedImage;
use crate::prompts::{PromptLoader, embedded};

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Error for a non-success HTTP response
///
/// 429 becomes `RateLimited`, honoring a numeric `retry-after` header.
fn status_error(status: u16, retry_after: Option<&str>, body: String) -> LlmError {
    if status == 429 {
        let secs = retry_after.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(60);
        return LlmError::RateLimited {
            retry_after: Duration::from_secs(secs),
        };
    }
    LlmError::ApiError { status, message: body }
}

/// Whether the request loop should try again after `err`
///
/// Rate limits go straight back to the caller, who decides when to retry.
fn should_retry(err: &LlmError) -> bool {
    err.is_retryable() && !err.is_rate_limit()
}

/// Gemini API client
pub struct GeminiClient {
    detect_model: String,
    design_model: String,
    chat_model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_retries: u32,
    prompts: Arc<PromptLoader>,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig, prompts: Arc<PromptLoader>) -> Result<Self, LlmError> {
        debug!(?config, "from_config: called");
        let api_key = config
            .get_api_key()
            .map_err(|_| LlmError::MissingApiKey(config.api_key_env.clone()))?;

        let mut builder = Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let http = builder.build().map_err(LlmError::Network)?;

        Ok(Self {
            detect_model: config.detect_model.clone(),
            design_model: config.design_model.clone(),
            chat_model: config.chat_model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_retries: config.max_retries,
            prompts,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Build the feature detection request
    fn build_detect_request(&self, image: &EncodedImage) -> Result<GenerateContentRequest, LlmError> {
        let prompt = self.prompts.detect_prompt().map_err(|e| LlmError::Prompt(e.to_string()))?;
        Ok(GenerateContentRequest {
            contents: vec![Content::user(vec![Part::image(image), Part::text(prompt)])],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(serde_json::json!({
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                })),
                ..Default::default()
            }),
        })
    }

    /// Build the design generation request
    ///
    /// Part order: base image, optional reference image, instructions.
    fn build_design_request(&self, request: &DesignRequest) -> Result<GenerateContentRequest, LlmError> {
        let prompt = self
            .prompts
            .design_prompt(request)
            .map_err(|e| LlmError::Prompt(e.to_string()))?;

        let mut parts = vec![Part::image(&request.base_image)];
        if let Some(ref reference) = request.reference_image {
            debug!("build_design_request: including reference image");
            parts.push(Part::image(reference));
        }
        parts.push(Part::text(prompt));

        Ok(GenerateContentRequest {
            contents: vec![Content::user(parts)],
            generation_config: None,
        })
    }

    /// Build the advisory chat request
    fn build_consult_request(&self, request: &ConsultRequest) -> Result<GenerateContentRequest, LlmError> {
        let prompt = self
            .prompts
            .consult_prompt(&request.history, &request.message)
            .map_err(|e| LlmError::Prompt(e.to_string()))?;

        Ok(GenerateContentRequest {
            contents: vec![Content::user(vec![Part::image(&request.image), Part::text(prompt)])],
            generation_config: None,
        })
    }

    /// POST a generateContent request, retrying transient failures if configured
    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        debug!(%model, "generate_content: called");
        let url = self.endpoint(model);

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "generate_content: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .http
                .post(url.clone())
                .header("x-goog-api-key", self.api_key.clone())
                .header("content-type", "application/json")
                .json(body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "generate_content: network error");
                    last_error = Some(LlmError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if !response.status().is_success() {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let text = response.text().await.unwrap_or_default();
                let err = status_error(status, retry_after.as_deref(), text);

                if should_retry(&err) && attempt < self.max_retries {
                    debug!(attempt, status, "generate_content: retryable error");
                    last_error = Some(err);
                    continue;
                }
                debug!(%status, error = %err, "generate_content: API error");
                return Err(err);
            }

            let text = response.text().await?;
            let api_response: GenerateContentResponse = serde_json::from_str(&text)?;
            if let Some(ref usage) = api_response.usage_metadata {
                debug!(
                    %model,
                    prompt_tokens = usage.prompt_token_count,
                    output_tokens = usage.candidates_token_count,
                    total_tokens = usage.total_token_count,
                    "generate_content: success"
                );
            }
            if let Some(reason) = api_response.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref()) {
                warn!(%model, %reason, "generate_content: prompt blocked");
            }
            if let Some(reason) = api_response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .filter(|r| *r != "STOP")
            {
                warn!(%model, %reason, "generate_content: unusual finish reason");
            }
            return Ok(api_response);
        }

        Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("Max retries exceeded".to_string())))
    }
}

/// Parse the detector's JSON answer into trimmed, non-empty labels
///
/// Anything that isn't a JSON array of strings yields an empty list.
fn parse_feature_labels(text: &str) -> Vec<String> {
    let text = if text.trim().is_empty() { "[]" } else { text };
    match serde_json::from_str::<Vec<String>>(text) {
        Ok(labels) => labels
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        Err(e) => {
            warn!(error = %e, "Failed to parse object detection results");
            Vec::new()
        }
    }
}

/// Pull the rendered image out of a generation response
fn extract_design(response: &GenerateContentResponse) -> Result<EncodedImage, LlmError> {
    if response.first_parts().is_none() {
        return Err(LlmError::NoDesign);
    }
    response.first_image().ok_or(LlmError::NoImageData)
}

/// Advisory text, or the fallback when the model said nothing
fn reply_or_fallback(text: String) -> String {
    if text.trim().is_empty() {
        embedded::FALLBACK_REPLY.to_string()
    } else {
        text
    }
}

#[async_trait]
impl ArchitectClient for GeminiClient {
    async fn detect_features(&self, image: &EncodedImage) -> Result<Vec<String>, LlmError> {
        debug!(model = %self.detect_model, "detect_features: called");
        let body = self.build_detect_request(image)?;
        let response = self.generate_content(&self.detect_model, &body).await?;
        let labels = parse_feature_labels(&response.text());
        info!(count = labels.len(), "Detected yard features");
        Ok(labels)
    }

    async fn generate_design(&self, request: DesignRequest) -> Result<EncodedImage, LlmError> {
        debug!(
            model = %self.design_model,
            style = ?request.style,
            complexity = ?request.complexity,
            kept = request.kept_features.len(),
            "generate_design: called"
        );
        let body = self.build_design_request(&request)?;
        let response = self.generate_content(&self.design_model, &body).await?;
        let image = extract_design(&response)?;
        info!(bytes = image.data().len(), "Received design render");
        Ok(image)
    }

    async fn consult(&self, request: ConsultRequest) -> Result<String, LlmError> {
        debug!(model = %self.chat_model, history = request.history.len(), "consult: called");
        let body = self.build_consult_request(&request)?;
        let response = self.generate_content(&self.chat_model, &body).await?;
        Ok(reply_or_fallback(response.text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, DesignComplexity, GardenStyle};

    fn client() -> GeminiClient {
        // Built by hand so tests don't depend on environment variables
        GeminiClient {
            detect_model: "detect-model".to_string(),
            design_model: "design-model".to_string(),
            chat_model: "chat-model".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            http: Client::new(),
            max_retries: 0,
            prompts: Arc::new(PromptLoader::embedded_only()),
        }
    }

    fn image(data: &str) -> EncodedImage {
        EncodedImage::new("image/png", data)
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint("gemini-2.5-flash-image"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn test_detect_request_has_schema() {
        let body = serde_json::to_value(client().build_detect_request(&image("WUFSRA==")).unwrap()).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["data"], "WUFSRA==");
        assert!(parts[1]["text"].as_str().unwrap().contains("JSON array"));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert_eq!(body["generationConfig"]["responseSchema"]["items"]["type"], "STRING");
    }

    #[test]
    fn test_design_request_part_order() {
        let request = DesignRequest {
            base_image: image("QkFTRQ=="),
            reference_image: Some(EncodedImage::new("image/jpeg", "UkVG")),
            instruction: "Generate a professional landscape design".to_string(),
            style: Some(GardenStyle::Cottage),
            kept_features: vec!["Stone Statue".to_string()],
            complexity: DesignComplexity::Simple,
        };

        let body = serde_json::to_value(client().build_design_request(&request).unwrap()).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["data"], "QkFTRQ==");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        let text = parts[2]["text"].as_str().unwrap();
        assert!(text.contains("The style must be English Cottage."));
        assert!(text.contains("MINIMAL (LEAST DESTRUCTIVE)"));
        assert!(text.contains("Stone Statue"));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_design_request_without_reference() {
        let request = DesignRequest {
            base_image: image("QkFTRQ=="),
            reference_image: None,
            instruction: "Modify the previous design".to_string(),
            style: Some(GardenStyle::Zen),
            kept_features: vec![],
            complexity: DesignComplexity::Balanced,
        };

        let body = serde_json::to_value(client().build_design_request(&request).unwrap()).unwrap();
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_consult_request() {
        let request = ConsultRequest {
            history: vec![ChatMessage::assistant("Welcome"), ChatMessage::user("Why boxwood?")],
            image: image("Q1VS"),
            message: "Why boxwood?".to_string(),
        };

        let body = serde_json::to_value(client().build_consult_request(&request).unwrap()).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["data"], "Q1VS");
        assert!(parts[1]["text"].as_str().unwrap().contains("Client: Why boxwood?"));
    }

    #[test]
    fn test_parse_feature_labels() {
        assert_eq!(
            parse_feature_labels(r#"["Oak Tree", " Utility Box ", ""]"#),
            vec!["Oak Tree".to_string(), "Utility Box".to_string()]
        );
        assert!(parse_feature_labels("").is_empty());
        assert!(parse_feature_labels("not json").is_empty());
        assert!(parse_feature_labels(r#"{"features": ["Oak"]}"#).is_empty());
    }

    #[test]
    fn test_extract_design() {
        let no_candidates = GenerateContentResponse::default();
        assert!(matches!(extract_design(&no_candidates), Err(LlmError::NoDesign)));

        let text_only: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": [{"text": "Sorry"}]}}]}"#).unwrap();
        assert!(matches!(extract_design(&text_only), Err(LlmError::NoImageData)));

        let with_image: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "TkVX"}}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_design(&with_image).unwrap().data(), "TkVX");
    }

    #[test]
    fn test_reply_fallback() {
        assert_eq!(reply_or_fallback("  ".to_string()), embedded::FALLBACK_REPLY);
        assert_eq!(reply_or_fallback("Use clover".to_string()), "Use clover");
    }

    #[test]
    fn test_status_error_retry_policy() {
        assert!(should_retry(&status_error(503, None, String::new())));
        assert!(should_retry(&status_error(408, None, String::new())));
        assert!(!should_retry(&status_error(400, None, "bad".to_string())));

        // 429 is reported as RateLimited rather than retried
        let limited = status_error(429, Some("30"), String::new());
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(30)));
        assert!(!should_retry(&limited));
        assert_eq!(status_error(429, Some("soon"), String::new()).retry_after(), Some(Duration::from_secs(60)));
    }
}
