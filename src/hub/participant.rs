use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Opaque key identifying one live connection in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Public identity of a participant, as announced in the join handshake
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: String,
    pub player_name: String,
    pub player_emoji: String,
}

impl PlayerInfo {
    pub fn new(
        id: impl Into<String>,
        player_name: impl Into<String>,
        player_emoji: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            player_name: player_name.into(),
            player_emoji: player_emoji.into(),
        }
    }

    /// All three identity fields are non-empty
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.player_name.is_empty() && !self.player_emoji.is_empty()
    }
}

/// Why a frame could not be enqueued for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailed {
    /// The peer stopped draining its queue and it filled up
    QueueFull,
    /// The owning session dropped its receiver
    Closed,
}

impl DeliveryFailed {
    /// Label used when counting evictions
    pub fn error_type(&self) -> &'static str {
        match self {
            DeliveryFailed::QueueFull => "queue_full",
            DeliveryFailed::Closed => "write_failed",
        }
    }
}

/// Capability to enqueue outbound frames for one connection.
///
/// The session owns the socket and the receiving half of the queue; the hub
/// only ever holds this handle. The queue is bounded, so a peer that stops
/// reading surfaces as a failed delivery instead of unbounded buffering.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<String>,
}

impl ConnectionHandle {
    pub fn new(outbound: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            outbound,
        }
    }

    /// Creates a handle together with the receiving end of its outbound queue.
    ///
    /// Panics if `capacity` is zero.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Enqueues without waiting; the hub must never block on one peer
    pub fn deliver(&self, frame: String) -> Result<(), DeliveryFailed> {
        self.outbound.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryFailed::QueueFull,
            TrySendError::Closed(_) => DeliveryFailed::Closed,
        })
    }
}

/// Registry entry: a reachable connection plus whatever identity it has announced
#[derive(Debug, Clone)]
pub struct Participant {
    pub handle: ConnectionHandle,
    pub info: PlayerInfo,
}

impl Participant {
    /// A freshly connected participant with empty identity fields
    pub fn new(handle: ConnectionHandle) -> Self {
        Self {
            handle,
            info: PlayerInfo::default(),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.handle.id()
    }

    pub fn is_joined(&self) -> bool {
        self.info.is_complete()
    }
}
