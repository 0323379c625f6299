//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{DesignComplexity, GardenStyle};

/// Garden Studio - AI landscape architect
#[derive(Parser)]
#[command(
    name = "gs",
    about = "Redesign a photo of your yard and refine it through conversation",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose (DEBUG) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive design studio (default)
    Studio {
        /// Yard photo to start from
        #[arg(short, long)]
        photo: Option<PathBuf>,

        /// Reference design to imitate instead of a named style
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Garden style (modern, traditional, zen, mediterranean, tropical, desert, cottage)
        #[arg(short, long)]
        style: Option<GardenStyle>,

        /// Transformation level (simple, balanced, premium)
        #[arg(short = 'x', long)]
        complexity: Option<DesignComplexity>,
    },

    /// Detect keepable features in a yard photo
    Detect {
        /// Yard photo
        photo: PathBuf,
    },

    /// Generate a design in one shot and save it as a project
    Design {
        /// Yard photo
        photo: PathBuf,

        /// Reference design to imitate instead of a named style
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Garden style (modern, traditional, zen, mediterranean, tropical, desert, cottage)
        #[arg(short, long)]
        style: Option<GardenStyle>,

        /// Transformation level (simple, balanced, premium)
        #[arg(short = 'x', long)]
        complexity: Option<DesignComplexity>,

        /// Special requests for the architect
        #[arg(short, long)]
        notes: Option<String>,

        /// Keep only these detected features (repeatable); default keeps all
        #[arg(short, long = "keep", value_name = "FEATURE")]
        keep: Vec<String>,

        /// Where to write the render (default: output-dir from config)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List saved designs
    Gallery,

    /// Show a saved design and its conversation
    Show {
        /// Project ID (or unique prefix)
        id: String,
    },

    /// Write a saved design's current render to a file
    Export {
        /// Project ID (or unique prefix)
        id: String,

        /// Output file
        out: PathBuf,
    },
}
