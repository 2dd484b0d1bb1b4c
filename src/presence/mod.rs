mod payload;
mod session;
#[cfg(test)]
pub(crate) mod testing;
mod traits;

pub use payload::{
    PresenceButton, PresencePayload, BUTTON_LABEL_MAX_CHARS, REMAINING_HORIZON_SECS,
};
pub use session::{ConnectionState, PresenceSession, SessionStatus, KEEP_ALIVE_INTERVAL};
pub use traits::{ClientError, PresenceConnection, PresenceConnector};
