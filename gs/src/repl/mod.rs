//! Interactive design studio
//!
//! A line-oriented front end over the session controller: slash commands
//! fill in the design brief, anything else is chat with the architect.

mod session;

pub use session::{StudioRepl, render_path};

use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{DesignComplexity, EncodedImage, GardenStyle};
use crate::llm::create_client;
use crate::prompts::PromptLoader;
use crate::session::{Detection, SessionController};
use crate::store::ProjectStore;

/// Landing inputs given on the command line
#[derive(Debug, Clone, Default)]
pub struct StudioOptions {
    pub photo: Option<PathBuf>,
    pub reference: Option<PathBuf>,
    pub style: Option<GardenStyle>,
    pub complexity: Option<DesignComplexity>,
}

/// Open the project store configured in `config`
pub fn open_store(config: &Config) -> ProjectStore {
    ProjectStore::open(&config.storage.path, config.storage.quota_bytes)
}

/// Build a session controller with a live architect client
pub fn build_controller(config: &Config) -> Result<SessionController> {
    config.validate()?;

    let prompts = Arc::new(PromptLoader::new(config.studio.prompts_dir.clone()));
    let client = create_client(&config.llm, prompts.clone()).context("Failed to create architect client")?;

    Ok(SessionController::new(
        client,
        prompts,
        open_store(config),
        config.studio.default_style,
        config.studio.default_complexity,
    ))
}

/// Apply command-line landing inputs, detecting features of the photo
pub async fn apply_options(controller: &SessionController, options: &StudioOptions) -> Result<Option<Detection>> {
    debug!(?options, "apply_options: called");

    if let Some(style) = options.style {
        controller.select_style(style).await;
    }
    if let Some(complexity) = options.complexity {
        controller.set_complexity(complexity).await;
    }
    if let Some(ref path) = options.reference {
        let image = EncodedImage::from_path(path).context(format!("Failed to read {}", path.display()))?;
        controller.upload_reference_image(image).await;
    }

    match options.photo {
        Some(ref path) => {
            let image = EncodedImage::from_path(path).context(format!("Failed to read {}", path.display()))?;
            Ok(Some(controller.upload_yard_photo(image).await))
        }
        None => Ok(None),
    }
}

/// Run the interactive studio
///
/// This is the main entry point for `gs studio`.
pub async fn run_studio(config: &Config, options: StudioOptions) -> Result<()> {
    let controller = build_controller(config)?;

    if options.photo.is_some() {
        println!("Analyzing your yard...");
    }
    if let Some(Detection::Failed(e)) = apply_options(&controller, &options).await? {
        println!("Feature detection failed: {}", e);
    }

    info!("Starting studio REPL");
    let mut repl = StudioRepl::new(controller, config.studio.output_dir.clone());
    repl.run().await
}
