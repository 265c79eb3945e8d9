use thiserror::Error;

use super::participant::ConnectionId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    #[error("Connection not registered: {0}")]
    UnknownConnection(ConnectionId),

    #[error("Hub mailbox closed")]
    MailboxClosed,
}
