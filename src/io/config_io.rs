use std::fs;
use std::path::{Path, PathBuf};

use crate::io::state::{default_state_path, home_dir, state_dir};
use crate::model::config::Config;

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the config file path, respecting XDG_CONFIG_HOME
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    config_dir.join("braindump").join("config.toml")
}

/// Read the config from a specific path. A missing file is the default config.
pub fn read_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read the config from the default location.
pub fn read_config() -> Result<Config, ConfigError> {
    read_config_from(&config_path())
}

/// Apply environment and command-line overrides.
///
/// Precedence for the state file: `--state-file`, then `BRAINDUMP_STATE`,
/// then `storage.state_file`. `BRAINDUMP_LOG` overrides `log.level`.
pub fn apply_overrides(config: &mut Config, state_file: Option<&Path>) {
    if let Some(path) = state_file {
        config.storage.state_file = Some(path.to_path_buf());
    } else if let Ok(path) = std::env::var("BRAINDUMP_STATE")
        && !path.is_empty()
    {
        config.storage.state_file = Some(PathBuf::from(path));
    }

    if let Ok(level) = std::env::var("BRAINDUMP_LOG")
        && !level.is_empty()
    {
        config.log.level = level;
    }
}

/// Resolved state record path
pub fn resolve_state_path(config: &Config) -> PathBuf {
    config
        .storage
        .state_file
        .clone()
        .unwrap_or_else(default_state_path)
}

/// Resolved log directory
pub fn resolve_log_dir(config: &Config) -> PathBuf {
    match &config.log.dir {
        Some(dir) => dir.clone(),
        None => state_dir(&resolve_state_path(config)).join("logs"),
    }
}
