//! Prompt Template System
//!
//! Template loading chain:
//! 1. `{prompts-dir}/{name}.pmt` (user override, from config)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution. The design
//! rubric (transformation tiers, architectural boundaries, landscaping
//! principles, technical instructions) is not a template and always applies.

pub mod embedded;
mod loader;

pub use loader::{PromptLoader, transformation_level};
