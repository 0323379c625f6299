//! Garden Studio - AI landscape architect
//!
//! CLI entry point for the studio and the one-shot project commands.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use gardenstudio::cli::{Cli, Command};
use gardenstudio::config::Config;
use gardenstudio::domain::EncodedImage;
use gardenstudio::repl::{self, StudioOptions};
use gardenstudio::session::Detection;
use gardenstudio::view;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gardenstudio")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let log_file = fs::File::create(log_dir.join("gardenstudio.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, store = %config.storage.path.display(), "Garden Studio loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Studio {
            photo,
            reference,
            style,
            complexity,
        }) => {
            debug!("main: matched Studio command");
            let options = StudioOptions {
                photo,
                reference,
                style,
                complexity,
            };
            repl::run_studio(&config, options).await
        }
        Some(Command::Detect { photo }) => {
            debug!(photo = %photo.display(), "main: matched Detect command");
            cmd_detect(&config, photo).await
        }
        Some(Command::Design {
            photo,
            reference,
            style,
            complexity,
            notes,
            keep,
            out,
        }) => {
            debug!(photo = %photo.display(), ?style, ?complexity, "main: matched Design command");
            let options = StudioOptions {
                photo: Some(photo),
                reference,
                style,
                complexity,
            };
            cmd_design(&config, options, notes, keep, out).await
        }
        Some(Command::Gallery) => {
            debug!("main: matched Gallery command");
            cmd_gallery(&config)
        }
        Some(Command::Show { id }) => {
            debug!(%id, "main: matched Show command");
            cmd_show(&config, &id)
        }
        Some(Command::Export { id, out }) => {
            debug!(%id, out = %out.display(), "main: matched Export command");
            cmd_export(&config, &id, out)
        }
        None => {
            debug!("main: no command specified, launching studio");
            repl::run_studio(&config, StudioOptions::default()).await
        }
    }
}

/// Print the features detected in a yard photo
async fn cmd_detect(config: &Config, photo: PathBuf) -> Result<()> {
    let controller = repl::build_controller(config)?;
    let image = EncodedImage::from_path(&photo).context(format!("Failed to read {}", photo.display()))?;

    match controller.upload_yard_photo(image).await {
        Detection::Found(labels) if labels.is_empty() => {
            println!("{}", "No distinct features detected.".dimmed());
            Ok(())
        }
        Detection::Found(labels) => {
            for label in labels {
                println!("{}", label);
            }
            Ok(())
        }
        Detection::Failed(e) => Err(e).context("Feature detection failed"),
        Detection::Ignored => Ok(()),
    }
}

/// Generate one design, store it as a project and write the render
async fn cmd_design(
    config: &Config,
    options: StudioOptions,
    notes: Option<String>,
    keep: Vec<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let controller = repl::build_controller(config)?;

    println!("{}", "Analyzing your yard...".dimmed());
    if let Some(Detection::Failed(e)) = repl::apply_options(&controller, &options).await? {
        eprintln!("{} Feature detection failed: {}", "Warning:".yellow(), e);
    }

    if !keep.is_empty() {
        for label in controller.keep_only(&keep).await {
            eprintln!("{} '{}' was not detected in the photo", "Warning:".yellow(), label);
        }
    }
    if let Some(ref notes) = notes {
        controller.set_requirements(notes).await;
    }

    let inputs = controller.inputs().await;
    let kept = inputs.selection.kept();
    if !kept.is_empty() {
        println!("Preserving: {}", kept.join(", "));
    }

    println!("{}", "The architect is drafting your design...".dimmed());
    let project = controller
        .start_design()
        .await
        .context("Design generation failed")?
        .ok_or_else(|| eyre::eyre!("A design is already being generated"))?;

    let path = out.unwrap_or_else(|| repl::render_path(&config.studio.output_dir, &project, 1));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
    }
    project
        .current_image
        .write_to(&path)
        .context(format!("Failed to write {}", path.display()))?;

    view::print_project(&project);
    println!("Render saved to {}", path.display().to_string().green());
    Ok(())
}

fn cmd_gallery(config: &Config) -> Result<()> {
    let store = repl::open_store(config);
    view::print_gallery(store.list());
    Ok(())
}

fn cmd_show(config: &Config, id: &str) -> Result<()> {
    let store = repl::open_store(config);
    let project = store
        .resolve(id)
        .ok_or_else(|| eyre::eyre!("No project matches '{}'", id))?;
    view::print_project(project);
    Ok(())
}

fn cmd_export(config: &Config, id: &str, out: PathBuf) -> Result<()> {
    let store = repl::open_store(config);
    let project = store
        .resolve(id)
        .ok_or_else(|| eyre::eyre!("No project matches '{}'", id))?;
    project
        .current_image
        .write_to(&out)
        .context(format!("Failed to write {}", out.display()))?;
    println!("Saved {}", out.display().to_string().green());
    Ok(())
}
