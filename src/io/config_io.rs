use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Conventional config location: `<config-dir>/taskflow/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskflow").join("config.toml"))
}

/// Load the config file, falling back to defaults when it does not exist.
/// The file is user-maintained; the tool never writes it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
