//! CLI argument parsing for keystore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ks")]
#[command(author, version, about = "Inspect local key-value storage", long_about = None)]
pub struct Cli {
    /// Path to the storage directory
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stored keys with their sizes
    List,

    /// Print the value stored under a key
    Get {
        /// Key to read
        #[arg(required = true)]
        key: String,
    },

    /// Show total bytes used
    Usage {
        /// Quota to report against, in bytes
        #[arg(short, long)]
        quota: Option<u64>,
    },
}
