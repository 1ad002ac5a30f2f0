use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration from config.toml.
///
/// The file is user-maintained and entirely optional; every field falls back
/// to a default so a missing or minimal file just works.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot file override. Default: the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show seconds in tracked-time readouts (`12m 30s` vs `12m`).
    #[serde(default = "default_true")]
    pub show_seconds: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig { show_seconds: true }
    }
}

fn default_true() -> bool {
    true
}
