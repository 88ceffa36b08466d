//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths to all Satchel data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Local capture cache snapshot (`data/captures.json`).
    pub captures_file: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates it if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            captures_file: root.join("captures.json"),
            llm_config_file: root.join("llm-config.json"),
            root,
        })
    }
}

/// Top-level Satchel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatchelConfig {
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Quiet period before a debounced remote write flushes, in ms.
    pub sync_quiet_ms: u64,
}

impl SatchelConfig {
    pub const DEFAULT_SYNC_QUIET_MS: u64 = 3000;

    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let sync_quiet_ms = std::env::var("SATCHEL_SYNC_QUIET_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_SYNC_QUIET_MS);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            data_paths,
            sync_quiet_ms,
        })
    }
}
