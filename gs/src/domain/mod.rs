//! Garden Studio domain types
//!
//! - [`GardenStyle`] / [`DesignComplexity`] - the landing choices
//! - [`EncodedImage`] - base64 image payloads stored as data URLs
//! - [`DesignProject`] / [`ChatMessage`] - persisted projects and their chat
//! - [`FeatureSelection`] - detected yard features and which ones to keep

mod image;
mod project;
mod selection;
mod style;

pub use image::{EncodedImage, ImageError, sniff_mime_type};
pub use project::{ChatMessage, DesignProject, Role, project_name};
pub use selection::FeatureSelection;
pub use style::{DesignComplexity, GardenStyle};
