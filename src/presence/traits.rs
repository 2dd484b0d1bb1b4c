use async_trait::async_trait;

use super::payload::PresencePayload;

/// Failure reported by a presence client implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The client id cannot be used to open a connection
    #[error("Invalid client id: {0}")]
    InvalidClientId(String),

    /// Anything the transport reports, verbatim
    #[error("{0}")]
    Transport(String),
}

/// Opens connections to the host chat application (Discord, or a fake in tests)
#[async_trait]
pub trait PresenceConnector: Send + Sync {
    /// Returns the name of this client (for logging)
    fn name(&self) -> &'static str;

    /// Open a connection for the given application id
    async fn connect(&self, client_id: &str) -> Result<Box<dyn PresenceConnection>, ClientError>;
}

/// An open connection. Owned by exactly one session.
#[async_trait]
pub trait PresenceConnection: Send {
    /// Replace the displayed presence
    async fn update(&mut self, payload: &PresencePayload) -> Result<(), ClientError>;

    /// Close the connection
    async fn close(self: Box<Self>) -> Result<(), ClientError>;
}
