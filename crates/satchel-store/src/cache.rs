//! Local capture cache — a JSON snapshot file.
//!
//! Fast and always available. A missing or corrupt file is treated as
//! an empty store: the cache exists to survive restarts, not to be a
//! source of truth worth failing over.

use std::path::{Path, PathBuf};

use tracing::warn;

use satchel_core::{Capture, Result};

pub struct CaptureCache {
    path: PathBuf,
}

impl CaptureCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the cached snapshot. Missing file → empty list; malformed
    /// file → logged and treated as empty.
    pub fn load(&self) -> Vec<Capture> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(captures) => captures,
                Err(e) => {
                    warn!("Capture cache corrupt, starting empty: {}", e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }

    /// Write the full snapshot. Writes to a temp file first, then
    /// renames, so a crash mid-write never leaves a torn cache.
    pub fn save(&self, captures: &[Capture]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(captures)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
