use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Flat JSON file of giveaway ids that have already been announced.
///
/// The file holds a JSON array of strings. Order carries no meaning but is
/// kept stable so rewrites produce minimal diffs.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the announced ids.
    ///
    /// A missing, unreadable or malformed file yields an empty history: a
    /// corrupt file costs duplicate alerts, never a failed run.
    pub fn load(&self) -> Vec<String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history at {}, starting fresh", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read {}: {e} — treating history as empty", self.path.display());
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&contents) {
            Ok(ids) => {
                debug!("Loaded {} id(s) from {}", ids.len(), self.path.display());
                ids
            }
            Err(e) => {
                warn!("Malformed history in {}: {e} — treating history as empty", self.path.display());
                Vec::new()
            }
        }
    }

    /// Overwrite the file with the full id list. Not atomic.
    pub fn save(&self, ids: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string(ids).context("failed to serialize history")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!("Saved {} id(s) to {}", ids.len(), self.path.display());
        Ok(())
    }
}
