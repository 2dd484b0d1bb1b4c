//! Named presets, persisted together as one JSON object keyed by name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{non_blank, SessionConfig};
use crate::error::{Error, Result};

pub type Presets = BTreeMap<String, SessionConfig>;

pub struct PresetStore {
    path: PathBuf,
    presets: Presets,
}

impl PresetStore {
    /// Opens the store at `path`, reading whatever is already there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let presets = read_presets(&path);
        tracing::debug!("Loaded {} presets from {}", presets.len(), path.display());
        Self { path, presets }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file. A missing or unparsable file yields an empty mapping.
    pub fn load(&mut self) -> &Presets {
        self.presets = read_presets(&self.path);
        &self.presets
    }

    pub fn get(&self, name: &str) -> Option<&SessionConfig> {
        self.presets.get(name.trim())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Stores a snapshot of `config` under `name` and rewrites the whole file.
    pub fn save(&mut self, name: &str, config: &SessionConfig) -> Result<()> {
        let name = non_blank(name)
            .ok_or_else(|| Error::validation("Please enter a preset name."))?
            .to_string();

        tracing::info!("Saving preset '{}'", name);
        let previous = self.presets.insert(name.clone(), config.clone());

        if let Err(e) = self.write() {
            match previous {
                Some(old) => self.presets.insert(name, old),
                None => self.presets.remove(&name),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Removes a preset. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let Some(old) = self.presets.remove(name.trim()) else {
            return Ok(false);
        };

        tracing::info!("Deleting preset '{}'", name.trim());
        if let Err(e) = self.write() {
            self.presets.insert(name.trim().to_string(), old);
            return Err(e);
        }
        Ok(true)
    }

    /// Writes a single preset to a standalone file.
    pub fn export(&self, name: &str, target: &Path) -> Result<()> {
        let config = self
            .get(name)
            .ok_or_else(|| Error::validation(format!("No preset named '{}'", name.trim())))?;

        let context = format!("Failed to export preset to {}", target.display());
        let contents =
            serde_json::to_string_pretty(config).map_err(|e| Error::persistence(&context, e))?;
        fs::write(target, contents).map_err(|e| Error::persistence(&context, e))
    }

    /// Reads a standalone preset file and stores it under `name`.
    pub fn import(&mut self, name: &str, source: &Path) -> Result<()> {
        let contents = fs::read_to_string(source).map_err(|e| {
            Error::Persistence(format!("Failed to read {}: {}", source.display(), e))
        })?;
        let config: SessionConfig = serde_json::from_str(&contents).map_err(|e| {
            Error::Persistence(format!("Failed to parse {}: {}", source.display(), e))
        })?;
        self.save(name, &config)
    }

    fn write(&self) -> Result<()> {
        const CONTEXT: &str = "Failed to save presets";

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::persistence(CONTEXT, e))?;
        }

        let contents = serde_json::to_string_pretty(&self.presets)
            .map_err(|e| Error::persistence(CONTEXT, e))?;

        // Replace via rename so a crash never leaves a half-written file behind.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp);
                Error::persistence(CONTEXT, e)
            })
    }
}

fn read_presets(path: &Path) -> Presets {
    if !path.exists() {
        return Presets::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read presets file, starting empty: {}", e);
            return Presets::new();
        }
    };

    if contents.trim().is_empty() {
        return Presets::new();
    }

    match serde_json::from_str(&contents) {
        Ok(presets) => presets,
        Err(e) => {
            tracing::warn!("Failed to parse presets file, starting empty: {}", e);
            Presets::new()
        }
    }
}
