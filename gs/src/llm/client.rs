//! ArchitectClient trait definition

use async_trait::async_trait;

use super::{ConsultRequest, DesignRequest, LlmError};
use crate::domain::EncodedImage;

/// The three hosted-model calls the studio depends on
///
/// Each call is independent; conversation state lives in the project
/// history and is passed in explicitly.
#[async_trait]
pub trait ArchitectClient: Send + Sync {
    /// Identify distinct features in a yard photo
    ///
    /// Returns short labels in the order the model listed them. An
    /// unparseable answer yields an empty list rather than an error.
    async fn detect_features(&self, image: &EncodedImage) -> Result<Vec<String>, LlmError>;

    /// Render a redesigned yard
    ///
    /// Fails when the model answers without an image.
    async fn generate_design(&self, request: DesignRequest) -> Result<EncodedImage, LlmError>;

    /// Advisory text reply about the current render
    async fn consult(&self, request: ConsultRequest) -> Result<String, LlmError>;
}
