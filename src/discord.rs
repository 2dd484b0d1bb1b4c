//! Presence client backed by the Discord IPC socket

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use discord_sdk as ds;

use crate::presence::{ClientError, PresenceConnection, PresenceConnector, PresencePayload};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PARTY_ID: &str = "digirp-party";

pub struct DiscordConnector {
    connect_timeout: Duration,
}

impl DiscordConnector {
    pub fn new() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

impl Default for DiscordConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresenceConnector for DiscordConnector {
    fn name(&self) -> &'static str {
        "Discord"
    }

    async fn connect(&self, client_id: &str) -> Result<Box<dyn PresenceConnection>, ClientError> {
        let app_id: i64 = client_id
            .parse()
            .map_err(|_| ClientError::InvalidClientId(client_id.to_string()))?;

        let (wheel, handler) = ds::wheel::Wheel::new(Box::new(|err: ds::Error| {
            tracing::warn!(error = ?err, "Discord reported an error");
        }));
        let user = wheel.user();

        let discord = ds::Discord::new(
            ds::DiscordApp::PlainId(app_id),
            ds::Subscriptions::ACTIVITY,
            Box::new(handler),
        )
        .map_err(|e| ClientError::Transport(e.to_string()))?;

        if let Err(e) = wait_for_connection(user, self.connect_timeout).await {
            discord.disconnect().await;
            return Err(e);
        }

        Ok(Box::new(DiscordConnection {
            discord,
            _wheel: wheel,
        }))
    }
}

/// Waits until Discord accepts the handshake. The SDK retries in the
/// background, so an absent client only shows up as silence.
async fn wait_for_connection(
    mut user: ds::wheel::UserSpoke,
    timeout: Duration,
) -> Result<(), ClientError> {
    let connected = async {
        loop {
            if matches!(
                *user.0.borrow_and_update(),
                ds::wheel::UserState::Connected(_)
            ) {
                return Ok(());
            }

            if user.0.changed().await.is_err() {
                return Err(ClientError::Transport(
                    "Discord connection closed during handshake".to_string(),
                ));
            }
        }
    };

    match tokio::time::timeout(timeout, connected).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Transport(format!(
            "DiscordNotFound: no Discord client answered within {}s",
            timeout.as_secs()
        ))),
    }
}

struct DiscordConnection {
    discord: ds::Discord,
    _wheel: ds::wheel::Wheel,
}

#[async_trait]
impl PresenceConnection for DiscordConnection {
    async fn update(&mut self, payload: &PresencePayload) -> Result<(), ClientError> {
        self.discord
            .update_activity(activity(payload))
            .await
            .map(|_| ())
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), ClientError> {
        let cleared = self.discord.clear_activity().await;
        self.discord.disconnect().await;
        cleared
            .map(|_| ())
            .map_err(|e| ClientError::Transport(e.to_string()))
    }
}

fn activity(payload: &PresencePayload) -> ds::activity::ActivityBuilder {
    let mut builder = ds::activity::ActivityBuilder::default();

    if let Some(details) = &payload.details {
        builder = builder.details(details.clone());
    }
    if let Some(state) = &payload.state {
        builder = builder.state(state.clone());
    }

    if payload.large_image.is_some() || payload.small_image.is_some() {
        let mut assets = ds::activity::Assets::default();
        if let Some(key) = &payload.large_image {
            assets = assets.large(key.clone(), payload.large_text.clone());
        }
        if let Some(key) = &payload.small_image {
            assets = assets.small(key.clone(), payload.small_text.clone());
        }
        builder = builder.assets(assets);
    }

    if let Some([size, max]) = payload.party_size {
        builder = builder.party(
            PARTY_ID,
            NonZeroU32::new(size),
            NonZeroU32::new(max),
            ds::activity::PartyPrivacy::Private,
        );
    }

    if let Some(start) = payload.start {
        builder = builder.start_timestamp(start);
    }
    if let Some(end) = payload.end {
        builder = builder.end_timestamp(end);
    }

    for button in &payload.buttons {
        builder = builder.button(ds::activity::Button {
            label: button.label.clone(),
            url: button.url.clone(),
        });
    }

    builder
}
