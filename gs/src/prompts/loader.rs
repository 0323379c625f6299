//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults, and
//! assembles the full generation prompt around the fixed design rubric.

use std::path::PathBuf;

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::domain::{ChatMessage, DesignComplexity, GardenStyle, Role};
use crate::llm::DesignRequest;

/// Transformation tier text for a complexity level
pub fn transformation_level(complexity: DesignComplexity) -> &'static str {
    match complexity {
        DesignComplexity::Simple => embedded::TRANSFORMATION_SIMPLE,
        DesignComplexity::Balanced => embedded::TRANSFORMATION_BALANCED,
        DesignComplexity::Premium => embedded::TRANSFORMATION_PREMIUM,
    }
}

#[derive(Serialize)]
struct InstructionContext<'a> {
    style: Option<&'a str>,
    requirements: &'a str,
}

#[derive(Serialize)]
struct RefineContext<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct DesignContext<'a> {
    instruction: &'a str,
    style: Option<&'a str>,
}

#[derive(Serialize)]
struct ConsultContext<'a> {
    context: String,
    message: &'a str,
}

#[derive(Serialize)]
struct WelcomeContext<'a> {
    tier: String,
    style: Option<&'a str>,
    requirements: &'a str,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory holding `{name}.pmt` files
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that prefers templates from `override_dir`
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        let override_dir = override_dir.filter(|dir| {
            let exists = dir.is_dir();
            if !exists {
                debug!("Prompt override directory {} not found, using embedded prompts", dir.display());
            }
            exists
        });

        let mut hbs = Handlebars::new();
        // Prompts are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);

        Self { hbs, override_dir }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        Self::new(None)
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `{override_dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from user override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map(|rendered| rendered.trim().to_string())
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Instruction asking the vision model for keepable features
    pub fn detect_prompt(&self) -> Result<String> {
        self.load_template("detect")
    }

    /// Brief for the first design of a project
    pub fn design_instruction(&self, style: Option<GardenStyle>, requirements: &str) -> Result<String> {
        self.render(
            "design-instruction",
            &InstructionContext {
                style: style.map(|s| s.label()),
                requirements: requirements.trim(),
            },
        )
    }

    /// Brief for a chat-driven redesign
    pub fn refine_instruction(&self, message: &str) -> Result<String> {
        self.render("refine-instruction", &RefineContext { message: message.trim() })
    }

    /// Full text part of a generation request
    ///
    /// The transformation tier, architectural boundaries, landscaping
    /// principles, keep list and technical instructions are appended after
    /// the (overridable) opening, so an override cannot drop them.
    pub fn design_prompt(&self, request: &DesignRequest) -> Result<String> {
        let opening = self.render(
            "design",
            &DesignContext {
                instruction: request.instruction.trim_end_matches('.'),
                style: request.style.map(|s| s.label()),
            },
        )?;

        let mut sections = vec![
            opening,
            transformation_level(request.complexity).to_string(),
            embedded::ARCHITECTURAL_BOUNDARIES.to_string(),
            embedded::LANDSCAPING_PRINCIPLES.to_string(),
        ];
        if !request.kept_features.is_empty() {
            sections.push(format!("{} {}.", embedded::KEEP_PREFIX, request.kept_features.join(", ")));
        }
        sections.push(embedded::TECHNICAL_INSTRUCTIONS.to_string());

        Ok(sections.join("\n\n"))
    }

    /// Consultant prompt with the conversation rendered as a transcript
    pub fn consult_prompt(&self, history: &[ChatMessage], message: &str) -> Result<String> {
        let context = history
            .iter()
            .map(|m| {
                let speaker = match m.role {
                    Role::User => "Client",
                    Role::Assistant => "Architect",
                };
                format!("{}: {}", speaker, m.content)
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.render("consult", &ConsultContext { context, message })
    }

    /// Opening assistant message of a new project
    pub fn welcome_message(
        &self,
        style: Option<GardenStyle>,
        complexity: DesignComplexity,
        requirements: &str,
    ) -> Result<String> {
        self.render(
            "welcome",
            &WelcomeContext {
                tier: complexity.label().to_lowercase(),
                style: style.map(|s| s.label()),
                requirements: requirements.trim(),
            },
        )
    }

    /// Assistant message accompanying a chat-driven redesign
    pub fn refined_message(&self) -> Result<String> {
        self.load_template("refined")
    }
}
