//! KeyStore - local string key-value storage
//!
//! A small persistent store with browser-storage semantics: string keys map
//! to string values, every write replaces the whole value, and the total size
//! of all entries is bounded by an optional byte quota.
//!
//! # Architecture
//!
//! ```text
//! storage/
//! ├── .lock                 # exclusive lock held during writes
//! ├── garden_projects.val   # one file per key
//! └── ...
//! ```
//!
//! # Example
//!
//! ```ignore
//! use keystore::{KeyStore, StoreOptions};
//!
//! let store = KeyStore::open("storage", StoreOptions { quota_bytes: Some(5 * 1024 * 1024) })?;
//! store.set("garden_projects", "[]")?;
//! assert_eq!(store.get("garden_projects")?.as_deref(), Some("[]"));
//! ```

pub mod cli;
mod error;
mod store;

use std::path::PathBuf;

pub use error::StoreError;
pub use store::{KeyStore, StoreOptions, entry_size};

/// Default quota (64MB)
pub const DEFAULT_QUOTA_BYTES: u64 = 64 * 1024 * 1024;

/// Default storage directory shared by the `gs` and `ks` binaries
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gardenstudio")
        .join("storage")
}
