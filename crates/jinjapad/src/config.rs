//! Process configuration loaded from environment variables.
//!
//! Runtime settings that the operator edits through the UI live in
//! [`SettingsStore`](crate::settings::SettingsStore); this module only covers
//! what must be known before the server starts.

use std::path::{Path, PathBuf};

/// Default settings file name, relative to the data directory.
pub const DEFAULT_SETTINGS_FILE: &str = "jinjapad.toml";

/// Default history file name, relative to the data directory.
pub const DEFAULT_HISTORY_FILE: &str = "jinjapad.json";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1:8000").
    pub bind_addr: String,

    /// Base directory for the settings file, the history file and any
    /// relative fixture directory.
    pub data_dir: PathBuf,

    /// Path of the settings file.
    pub settings_path: PathBuf,

    /// Path of the history file.
    pub history_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults for local use)
    ///
    /// Optional:
    /// - `JINJAPAD_BIND_ADDR`: Server bind address (default: "127.0.0.1:8000")
    /// - `JINJAPAD_DATA_DIR`: Base directory (default: ".")
    /// - `JINJAPAD_SETTINGS_FILE`: Settings file (default: "jinjapad.toml")
    /// - `JINJAPAD_HISTORY_FILE`: History file (default: "jinjapad.json")
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("JINJAPAD_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());

        let data_dir = std::env::var("JINJAPAD_DATA_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let settings_file = std::env::var("JINJAPAD_SETTINGS_FILE")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_FILE.to_string());

        let history_file = std::env::var("JINJAPAD_HISTORY_FILE")
            .unwrap_or_else(|_| DEFAULT_HISTORY_FILE.to_string());

        if !data_dir.is_dir() {
            anyhow::bail!(
                "JINJAPAD_DATA_DIR {} is not a directory",
                data_dir.display()
            );
        }

        let config = Self {
            bind_addr,
            ..Self::with_data_dir(&data_dir, &settings_file, &history_file)
        };

        tracing::info!(
            bind_addr = %config.bind_addr,
            data_dir = %config.data_dir.display(),
            settings = %config.settings_path.display(),
            history = %config.history_path.display(),
            "configuration loaded"
        );

        Ok(config)
    }

    /// Build a configuration rooted at `data_dir`.
    ///
    /// Relative file names are joined onto the data directory; absolute ones
    /// are kept as given.
    pub fn with_data_dir(data_dir: &Path, settings_file: &str, history_file: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            data_dir: data_dir.to_path_buf(),
            settings_path: data_dir.join(settings_file),
            history_path: data_dir.join(history_file),
        }
    }
}
