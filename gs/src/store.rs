//! Project Store
//!
//! Holds the list of design projects, newest first, and mirrors it into the
//! key-value store as one JSON array. The in-memory list is authoritative:
//! persistence failures are logged and never surface to callers.

use std::path::Path;

use keystore::{KeyStore, StoreOptions};
use tracing::{debug, error, info, warn};

use crate::domain::DesignProject;

/// Storage key holding the serialized project list
pub const PROJECTS_KEY: &str = "garden_projects";

/// Copy of an unreadable project list, kept before it gets overwritten
pub const BACKUP_KEY: &str = "garden_projects.bak";

/// Characters of an unreadable value to include in the log
const RAW_PREVIEW_CHARS: usize = 200;

/// Ordered collection of design projects backed by a [`KeyStore`]
pub struct ProjectStore {
    projects: Vec<DesignProject>,
    backend: Option<KeyStore>,
}

impl ProjectStore {
    /// Open the store at `path` and load the saved projects
    ///
    /// An unreadable backend degrades to an in-memory store.
    pub fn open(path: impl AsRef<Path>, quota_bytes: Option<u64>) -> Self {
        let path = path.as_ref();
        match KeyStore::open(path, StoreOptions { quota_bytes }) {
            Ok(backend) => Self::with_backend(backend),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to open project storage, changes will not persist");
                Self::in_memory()
            }
        }
    }

    /// Load projects from an already-open key-value store
    pub fn with_backend(backend: KeyStore) -> Self {
        let projects = load(&backend);
        Self {
            projects,
            backend: Some(backend),
        }
    }

    /// A store that never persists
    pub fn in_memory() -> Self {
        Self {
            projects: Vec::new(),
            backend: None,
        }
    }

    /// Write the whole list to the backend
    ///
    /// Returns whether the write succeeded.
    pub fn save(&self) -> bool {
        let Some(ref backend) = self.backend else {
            return false;
        };

        let json = match serde_json::to_string(&self.projects) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to serialize projects");
                return false;
            }
        };

        match backend.set(PROJECTS_KEY, &json) {
            Ok(()) => {
                debug!(count = self.projects.len(), bytes = json.len(), "save: projects written");
                true
            }
            Err(e) if e.is_quota_exceeded() => {
                warn!(error = %e, "Storage quota exceeded, projects kept in memory only");
                false
            }
            Err(e) => {
                error!(error = %e, "Failed to save projects");
                false
            }
        }
    }

    /// Add a new project at the front of the list and persist
    pub fn prepend(&mut self, project: DesignProject) {
        info!(id = %project.id, name = %project.name, "Adding project");
        self.projects.insert(0, project);
        self.save();
    }

    /// Replace the project with the same id and persist
    ///
    /// Returns false when no project has that id.
    pub fn replace(&mut self, project: DesignProject) -> bool {
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => {
                debug!(id = %project.id, "replace: updating project");
                *slot = project;
                self.save();
                true
            }
            None => {
                warn!(id = %project.id, "replace: project not found");
                false
            }
        }
    }

    /// Project by exact id
    pub fn get(&self, id: &str) -> Option<&DesignProject> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Project by exact id or unique id prefix
    pub fn resolve(&self, id_or_prefix: &str) -> Option<&DesignProject> {
        if let Some(project) = self.get(id_or_prefix) {
            return Some(project);
        }
        if id_or_prefix.is_empty() {
            return None;
        }
        let mut matches = self.projects.iter().filter(|p| p.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(project), None) => Some(project),
            _ => None,
        }
    }

    /// All projects, newest first
    pub fn list(&self) -> &[DesignProject] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

fn load(backend: &KeyStore) -> Vec<DesignProject> {
    let json = match backend.get(PROJECTS_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => {
            debug!("load: no saved projects");
            return Vec::new();
        }
        Err(e) => {
            error!(error = %e, "Failed to read saved projects");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<DesignProject>>(&json) {
        Ok(projects) => {
            info!(count = projects.len(), "Loaded saved projects");
            projects
        }
        Err(e) => {
            let preview: String = json.chars().take(RAW_PREVIEW_CHARS).collect();
            error!(error = %e, bytes = json.len(), raw = %preview, "Failed to load projects");
            match backend.set(BACKUP_KEY, &json) {
                Ok(()) => warn!(key = BACKUP_KEY, "Unreadable projects copied aside"),
                Err(e) => error!(error = %e, "Failed to back up unreadable projects"),
            }
            Vec::new()
        }
    }
}
