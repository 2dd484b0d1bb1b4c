use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SessionConfig;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "digirp";
const DATA_DIR_ENV: &str = "DIGIRP_DATA_DIR";
const PRESETS_FILE: &str = "presets.json";
const LAST_CONFIG_FILE: &str = "digirp_config.json";
const LOG_DIR: &str = "logs";

/// Where everything this application persists lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolves the data directory: explicit override, then `DIGIRP_DATA_DIR`,
    /// then the platform config directory, then the working directory.
    pub fn resolve(override_dir: Option<PathBuf>) -> Self {
        let data_dir = override_dir
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from("."));
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn presets_file(&self) -> PathBuf {
        self.data_dir.join(PRESETS_FILE)
    }

    pub fn last_config_file(&self) -> PathBuf {
        self.data_dir.join(LAST_CONFIG_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR)
    }

    pub fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            Error::Persistence(format!(
                "Failed to create data directory {}: {}",
                self.data_dir.display(),
                e
            ))
        })
    }
}

/// Loads the config left behind by the previous session. Anything unreadable
/// is treated as no prior config.
pub fn load_last_config(path: &Path) -> Option<SessionConfig> {
    tracing::debug!("Loading last session config from {}", path.display());

    if !path.exists() {
        return None;
    }

    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read last session config, ignoring: {}", e);
            return None;
        }
    };

    if contents.trim().is_empty() {
        tracing::warn!("Last session config is empty, ignoring");
        return None;
    }

    match serde_json::from_str(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse last session config, ignoring: {}", e);
            None
        }
    }
}

pub fn save_last_config(path: &Path, config: &SessionConfig) -> Result<()> {
    const CONTEXT: &str = "Failed to write last session config";

    tracing::debug!("Saving last session config");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::persistence(CONTEXT, e))?;
    }

    let contents =
        serde_json::to_string_pretty(config).map_err(|e| Error::persistence(CONTEXT, e))?;
    fs::write(path, contents).map_err(|e| Error::persistence(CONTEXT, e))
}
