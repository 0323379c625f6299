use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use keystore::cli::{Cli, Command};
use keystore::{KeyStore, StoreOptions};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let path = cli.path.unwrap_or_else(keystore::default_store_path);

    info!("keystore starting at {}", path.display());

    match cli.command {
        Command::List => {
            let store = KeyStore::open(&path, StoreOptions::default())?;
            let keys = store.keys()?;
            if keys.is_empty() {
                println!("No keys found");
            } else {
                for key in keys {
                    let size = store.get(&key)?.map(|v| v.len()).unwrap_or(0);
                    println!("{} {}", key.cyan(), format!("{} bytes", size).dimmed());
                }
            }
        }
        Command::Get { key } => {
            let store = KeyStore::open(&path, StoreOptions::default())?;
            match store.get(&key)? {
                Some(value) => println!("{}", value),
                None => eyre::bail!("Key not found: {}", key),
            }
        }
        Command::Usage { quota } => {
            let store = KeyStore::open(&path, StoreOptions { quota_bytes: quota })?;
            let used = store.usage()?;
            println!("Storage: {}", path.display().to_string().cyan());
            println!("  Used: {} bytes", used);
            if let Some(quota) = store.quota_bytes() {
                let pct = if quota == 0 { 100.0 } else { used as f64 * 100.0 / quota as f64 };
                println!("  Quota: {} bytes ({:.1}% used)", quota, pct);
            }
        }
    }

    Ok(())
}
