//! Design projects and their chat history

use serde::{Deserialize, Serialize};

use super::{DesignComplexity, EncodedImage, GardenStyle};

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in a project's conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Render attached to an assistant reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<EncodedImage>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            image_url: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            image_url: None,
        }
    }

    /// Assistant reply carrying a new render
    pub fn assistant_with_image(text: impl Into<String>, image: EncodedImage) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            image_url: Some(image),
        }
    }
}

/// A generated garden design and the conversation refining it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignProject {
    pub id: String,
    pub name: String,
    /// The uploaded yard photo; every regeneration starts from it
    pub original_image: EncodedImage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<EncodedImage>,
    /// Most recent successful render
    pub current_image: EncodedImage,
    /// `None` when the design follows the reference image
    pub style: Option<GardenStyle>,
    pub complexity: DesignComplexity,
    /// Features preserved when the project was generated
    #[serde(default)]
    pub kept_features: Vec<String>,
    pub history: Vec<ChatMessage>,
    /// Unix milliseconds
    pub created_at: i64,
}

impl DesignProject {
    /// Last message in the conversation
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.history.last()
    }

    /// Number of renders produced, counting the first design
    pub fn render_count(&self) -> usize {
        1 + self.history.iter().filter(|m| m.image_url.is_some()).count()
    }

    /// Creation time formatted for listings
    pub fn created_display(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.created_at)
            .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Display name for a new project
pub fn project_name(style: Option<GardenStyle>) -> String {
    match style {
        Some(style) => format!("My {} Garden", style.label()),
        None => "My Reference-based Garden".to_string(),
    }
}
