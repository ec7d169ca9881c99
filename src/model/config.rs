use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration from config.toml. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub debounce: DebounceConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where the state record lives. None = `$XDG_DATA_HOME/braindump/state.json`
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Delay before a changed state is written to disk
    #[serde(default = "default_delay_ms")]
    pub persist_ms: u64,
    /// Delay before the brain dump is re-derived after a body edit
    #[serde(default = "default_delay_ms")]
    pub recompute_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        DebounceConfig {
            persist_ms: default_delay_ms(),
            recompute_ms: default_delay_ms(),
        }
    }
}

fn default_delay_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// None = `<state dir>/logs`
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Post labels wider than this are cut with `…` in listings
    #[serde(default = "default_max_label_width")]
    pub max_label_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            max_label_width: default_max_label_width(),
        }
    }
}

fn default_max_label_width() -> usize {
    48
}
