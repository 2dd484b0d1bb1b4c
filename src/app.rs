//! The actions a front end wires its controls to.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::presence::{PresenceConnector, PresenceSession, SessionStatus};
use crate::presets::PresetStore;
use crate::settings::{load_last_config, save_last_config, AppPaths};

pub struct PresenceApp {
    paths: AppPaths,
    config: SessionConfig,
    session: PresenceSession,
    presets: PresetStore,
}

impl PresenceApp {
    /// Restores the last session's fields and the preset store.
    pub fn new(paths: AppPaths, connector: Arc<dyn PresenceConnector>) -> Self {
        let config = load_last_config(&paths.last_config_file()).unwrap_or_default();
        let presets = PresetStore::open(paths.presets_file());
        Self::with_session(paths, config, PresenceSession::new(connector), presets)
    }

    pub fn with_session(
        paths: AppPaths,
        config: SessionConfig,
        session: PresenceSession,
        presets: PresetStore,
    ) -> Self {
        Self {
            paths,
            config,
            session,
            presets,
        }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn presets_mut(&mut self) -> &mut PresetStore {
        &mut self.presets
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.session.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub async fn connect(&mut self) -> Result<()> {
        let result = self.session.connect(&self.config).await;
        if self.session.is_connected() {
            self.remember();
        }
        result
    }

    pub async fn update(&mut self) -> Result<()> {
        self.session.update(&self.config).await?;
        self.remember();
        Ok(())
    }

    pub async fn disconnect(&mut self) {
        self.session.disconnect().await;
    }

    /// Empties the text fields, keeping the client id and timestamp mode.
    pub fn clear(&mut self) {
        self.config.clear();
    }

    pub fn save_preset(&mut self, name: &str) -> Result<()> {
        self.presets.save(name, &self.config)
    }

    /// Replaces the current fields with a stored preset.
    pub fn load_preset(&mut self, name: &str) -> Result<()> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| Error::validation(format!("No preset named '{}'", name.trim())))?;
        self.config = preset.clone();
        tracing::info!("Loaded preset '{}'", name.trim());
        Ok(())
    }

    /// Re-reads the last-session file. Returns whether one was found.
    pub fn reload_config(&mut self) -> bool {
        match load_last_config(&self.paths.last_config_file()) {
            Some(config) => {
                self.config = config;
                true
            }
            None => false,
        }
    }

    /// Writes the current fields as the last-session config.
    pub fn persist_config(&self) -> Result<()> {
        save_last_config(&self.paths.last_config_file(), &self.config)
    }

    fn remember(&self) {
        if let Err(e) = self.persist_config() {
            tracing::warn!("Failed to remember session config: {}", e);
        }
    }
}
