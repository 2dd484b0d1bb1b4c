//! Connection lifecycle for one presence session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::payload::PresencePayload;
use super::traits::{ClientError, PresenceConnection, PresenceConnector};
use crate::config::SessionConfig;
use crate::error::{ConnectionError, Error, Result};

pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Error text that means the chat client is not running at all.
const HOST_MISSING_SIGNATURES: &[&str] = &[
    "FileNotFoundError",
    "DiscordNotFound",
    "No such file or directory",
    "cannot find the file",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// What the shell renders: the connection state and the most recent failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub state: ConnectionState,
    pub last_error: Option<String>,
}

/// Owns the connection to the host chat application.
pub struct PresenceSession {
    connector: Arc<dyn PresenceConnector>,
    connection: Option<Box<dyn PresenceConnection>>,
    started_at: Option<DateTime<Utc>>,
    running: Arc<AtomicBool>,
    keep_alive: Option<JoinHandle<()>>,
    keep_alive_interval: Duration,
    status: watch::Sender<SessionStatus>,
}

impl PresenceSession {
    pub fn new(connector: Arc<dyn PresenceConnector>) -> Self {
        let (status, _) = watch::channel(SessionStatus::default());
        Self {
            connector,
            connection: None,
            started_at: None,
            running: Arc::new(AtomicBool::new(false)),
            keep_alive: None,
            keep_alive_interval: KEEP_ALIVE_INTERVAL,
            status,
        }
    }

    #[must_use]
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.status.borrow().state
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Opens a connection with the config's client id and pushes the config.
    ///
    /// The session stays connected when only the initial push fails; that
    /// error is still returned.
    pub async fn connect(&mut self, config: &SessionConfig) -> Result<()> {
        let Some(client_id) = config.client_id() else {
            return Err(self.fail(Error::validation(
                "Please enter a Client ID! Get one at discord.com/developers/applications",
            )));
        };

        if self.is_connected() {
            tracing::info!("Already connected, reconnecting");
            self.disconnect().await;
        }

        tracing::info!(
            "Connecting to {} with client id {}",
            self.connector.name(),
            client_id
        );
        self.set_state(ConnectionState::Connecting);

        let connection = match self.connector.connect(client_id).await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::error!("Connection error: {}", e);
                self.set_state(ConnectionState::Disconnected);
                return Err(self.fail(classify_connect_error(e)));
            }
        };

        self.connection = Some(connection);
        self.started_at = Some(Utc::now());
        self.status.send_replace(SessionStatus {
            state: ConnectionState::Connected,
            last_error: None,
        });
        tracing::info!("Connected successfully");

        self.start_keep_alive();
        self.update(config).await
    }

    /// Pushes `config` over the open connection.
    pub async fn update(&mut self, config: &SessionConfig) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let started_at = self.started_at.unwrap_or_else(Utc::now).timestamp();
        let payload = match PresencePayload::build(config, started_at, Utc::now().timestamp()) {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e)),
        };

        let Some(connection) = self.connection.as_mut() else {
            return Err(Error::NotConnected);
        };

        tracing::debug!("Updating presence: {:?}", payload);
        let result = connection.update(&payload).await;
        if let Err(e) = result {
            tracing::error!("Update error: {}", e);
            return Err(self.fail(Error::Update(e.to_string())));
        }

        self.status.send_modify(|status| status.last_error = None);
        tracing::debug!("Presence updated successfully");
        Ok(())
    }

    /// Closes the connection if one is open. Safe to call repeatedly; close
    /// failures are logged and otherwise ignored.
    pub async fn disconnect(&mut self) {
        self.stop_keep_alive();
        self.started_at = None;

        if let Some(connection) = self.connection.take() {
            match connection.close().await {
                Ok(()) => tracing::info!("Disconnected successfully"),
                Err(e) => tracing::warn!("Ignoring error while disconnecting: {}", e),
            }
        }

        self.set_state(ConnectionState::Disconnected);
    }

    fn start_keep_alive(&mut self) {
        self.stop_keep_alive();
        self.running.store(true, Ordering::Release);

        let running = Arc::clone(&self.running);
        let interval = self.keep_alive_interval;
        self.keep_alive = Some(tokio::spawn(keep_alive(running, interval)));
    }

    fn stop_keep_alive(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.keep_alive.take() {
            handle.abort();
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.status.send_if_modified(|status| {
            let changed = status.state != state;
            status.state = state;
            changed
        });
    }

    fn fail(&self, error: Error) -> Error {
        let message = error.to_string();
        self.status
            .send_modify(|status| status.last_error = Some(message));
        error
    }
}

impl Drop for PresenceSession {
    fn drop(&mut self) {
        self.stop_keep_alive();
        if self.connection.is_some() {
            tracing::debug!("Presence session dropped while connected");
        }
    }
}

/// Idles while the session runs. The transport keeps itself alive; this only
/// holds a task slot for periodic work.
async fn keep_alive(running: Arc<AtomicBool>, interval: Duration) {
    tracing::debug!("Keep-alive loop started");
    while running.load(Ordering::Acquire) {
        tokio::time::sleep(interval).await;
        tracing::trace!("Keep-alive tick");
    }
    tracing::debug!("Keep-alive loop stopped");
}

fn classify_connect_error(error: ClientError) -> Error {
    match error {
        ClientError::InvalidClientId(id) => {
            Error::validation(format!("Client ID '{}' is not a valid application id", id))
        }
        ClientError::Transport(message) => {
            if HOST_MISSING_SIGNATURES
                .iter()
                .any(|signature| message.contains(signature))
            {
                ConnectionError::HostNotRunning.into()
            } else {
                ConnectionError::Failed(message).into()
            }
        }
    }
}
