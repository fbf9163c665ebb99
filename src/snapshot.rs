//! Draft persistence for the in-progress application
//!
//! Saves the form's raw values to a JSON draft file under the platform
//! data directory so a closed session can be resumed. The store is
//! deliberately forgiving: if the directory cannot be resolved or any
//! IO fails, every operation degrades to a no-op with a logged warning.
//! Nothing in here ever propagates an error to the caller.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Fixed file name the draft is stored under
const DRAFT_FILE: &str = "draft.json";

/// The persisted copy of all field values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub values: BTreeMap<String, String>,
}

/// Disk-backed store for the form draft
///
/// The store exclusively owns the draft file; no other component reads
/// or writes it.
pub struct SnapshotStore {
    path: Option<PathBuf>,
}

impl SnapshotStore {
    /// Store under the platform data directory
    pub fn new() -> Self {
        let path = ProjectDirs::from("io", "credit", "credit-tui")
            .map(|dirs| dirs.data_dir().join(DRAFT_FILE));
        if path.is_none() {
            tracing::warn!("no data directory available; drafts will not be saved");
        }
        Self { path }
    }

    /// Store at an explicit location (used by tests)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A store with no backing location; every operation is a no-op
    #[allow(dead_code)]
    pub fn unavailable() -> Self {
        Self { path: None }
    }

    /// Write the full field map as the current draft
    pub fn save(&self, values: &BTreeMap<String, String>) {
        let Some(path) = &self.path else {
            return;
        };
        let snapshot = Snapshot {
            values: values.clone(),
        };
        let content = match serde_json::to_string_pretty(&snapshot) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("failed to serialize draft: {err}");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!("failed to create draft directory: {err}");
                return;
            }
        }
        if let Err(err) = fs::write(path, content) {
            tracing::warn!("failed to write draft: {err}");
        }
    }

    /// Read the saved draft, if one exists and parses
    pub fn load(&self) -> Option<Snapshot> {
        let path = self.path.as_ref()?;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!("failed to read draft: {err}");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!("ignoring unreadable draft: {err}");
                None
            }
        }
    }

    /// Remove the saved draft; clearing an absent draft is not an error
    pub fn clear(&self) {
        let Some(path) = &self.path else {
            return;
        };
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("failed to clear draft: {err}"),
        }
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
