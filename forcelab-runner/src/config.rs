//! Strategy configuration files.

use std::path::{Path, PathBuf};

use thiserror::Error;

use forcelab_core::engine::check_warmup;
use forcelab_core::{ConfigError, StrategyConfig};

/// Errors from reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Load and validate a TOML strategy config.
///
/// Missing keys fall back to defaults. A warm-up shorter than the longest
/// rule dependency is accepted but logged.
pub fn load_config(path: &Path) -> Result<StrategyConfig, ConfigFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = StrategyConfig::from_toml_str(&text).map_err(|source| ConfigFileError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    check_warmup(&config);
    tracing::debug!(path = %path.display(), fingerprint = %config.fingerprint(), "loaded config");
    Ok(config)
}

/// `load_config` when a path is given, defaults otherwise.
pub fn load_config_or_default(path: Option<&Path>) -> Result<StrategyConfig, ConfigFileError> {
    match path {
        Some(p) => load_config(p),
        None => Ok(StrategyConfig::default()),
    }
}
