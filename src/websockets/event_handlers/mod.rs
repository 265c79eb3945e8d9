// Re-export all handlers
pub use chat_events::ChatEventHandlers;
pub use drawing_events::DrawingEventHandlers;
pub use player_events::PlayerEventHandlers;

mod chat_events;
mod drawing_events;
mod player_events;

use thiserror::Error;

use crate::hub::HubError;
use crate::websockets::messages::CodecError;

/// Why a decoded client message could not be relayed
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Hub error: {0}")]
    Hub(#[from] HubError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Received {message_type} before join")]
    NotJoined { message_type: &'static str },
}

impl RelayError {
    /// Label used when counting this error
    pub fn error_type(&self) -> &'static str {
        match self {
            RelayError::Hub(HubError::UnknownConnection(_)) => "unknown_connection",
            RelayError::Hub(HubError::MailboxClosed) => "hub_unavailable",
            RelayError::Codec(e) => e.error_type(),
            RelayError::NotJoined { .. } => "not_joined",
        }
    }
}
