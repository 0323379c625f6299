//! Garden Studio - AI landscape architect
//!
//! Takes a photo of a yard, detects the features worth keeping, renders a
//! professional redesign through a hosted multimodal model and refines it
//! through conversation. Every design is saved as a project with its chat.
//!
//! # Modules
//!
//! - [`domain`] - styles, images, projects and feature selection
//! - [`llm`] - architect client trait and Gemini implementation
//! - [`prompts`] - prompt templates and the fixed design rubric
//! - [`session`] - session controller, chat routing and outcomes
//! - [`store`] - persisted project list
//! - [`config`] - configuration types and loading
//! - [`repl`] - interactive studio
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod session;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use domain::{ChatMessage, DesignComplexity, DesignProject, EncodedImage, FeatureSelection, GardenStyle, Role};
pub use llm::{ArchitectClient, ConsultRequest, DesignRequest, GeminiClient, LlmError, create_client};
pub use prompts::PromptLoader;
pub use session::{ChatOutcome, Detection, Intent, SessionController, SessionError, View};
pub use store::ProjectStore;
