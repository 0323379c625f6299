//! Request/response types for Garden Studio model calls
//!
//! [`DesignRequest`] and [`ConsultRequest`] are the provider-agnostic inputs
//! to an [`ArchitectClient`](super::ArchitectClient). The remaining types model
//! the Gemini `generateContent` wire format.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, DesignComplexity, EncodedImage, GardenStyle};

/// Everything needed for one design generation
#[derive(Debug, Clone)]
pub struct DesignRequest {
    /// Photo being redesigned (always the original upload)
    pub base_image: EncodedImage,

    /// Optional design to imitate
    pub reference_image: Option<EncodedImage>,

    /// What to do this time, e.g. the first-design brief or a chat edit
    pub instruction: String,

    /// Named style, or `None` to follow the reference image
    pub style: Option<GardenStyle>,

    /// Features that must survive untouched
    pub kept_features: Vec<String>,

    pub complexity: DesignComplexity,
}

/// Everything needed for one advisory reply
#[derive(Debug, Clone)]
pub struct ConsultRequest {
    /// Conversation so far, including the new message
    pub history: Vec<ChatMessage>,

    /// Render under discussion
    pub image: EncodedImage,

    /// The new client message
    pub message: String,
}

// Gemini wire format

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Content {
    /// A user turn with the given parts
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            parts,
            role: Some("user".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        thought: bool,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Anything else the API sends back (function calls, signatures, ...)
    Other(serde_json::Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            thought: false,
        }
    }

    pub fn image(image: &EncodedImage) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type().to_string(),
                data: image.data().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String, // base64 encoded data
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, if it has any
    pub fn first_parts(&self) -> Option<&[Part]> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .filter(|parts| !parts.is_empty())
    }

    /// Concatenated non-thought text of the first candidate
    pub fn text(&self) -> String {
        self.first_parts()
            .unwrap_or_default()
            .iter()
            .filter_map(|part| match part {
                Part::Text { text, thought: false } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First inline image of the first candidate
    pub fn first_image(&self) -> Option<EncodedImage> {
        self.first_parts()?.iter().find_map(|part| match part {
            Part::InlineData { inline_data } => Some(EncodedImage::new(&inline_data.mime_type, &inline_data.data)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}
