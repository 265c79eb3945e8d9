use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hub::{BroadcastEvent, EventKind, PlayerInfo};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("Invalid {message_type} payload: {source}")]
    InvalidPayload {
        message_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CodecError {
    /// Label used when counting this error
    pub fn error_type(&self) -> &'static str {
        match self {
            CodecError::MalformedEnvelope(_) => "malformed_envelope",
            CodecError::InvalidPayload { .. } => "invalid_payload",
            CodecError::Encode(_) => "encode",
        }
    }
}

/// Raw `{ "type": ..., "payload": ... }` frame before the payload is interpreted
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    message_type: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Chat message, relayed to everyone exactly as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub id: String,
    pub player_name: String,
    pub player_emoji: String,
    #[serde(alias = "text")]
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A single brush position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawPayload {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A completed stroke as an ordered list of points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPayload {
    pub points: Vec<Point>,
    pub color: String,
    pub stroke_width: f64,
}

/// Decoded client frame
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Join(PlayerInfo),
    Chat(ChatPayload),
    Draw(DrawPayload),
    Path(PathPayload),
    Clear,
    /// Well-formed envelope with a type this server does not handle
    Unrecognized(String),
}

impl ClientMessage {
    pub fn decode(frame: &str) -> Result<Self, CodecError> {
        let envelope: Envelope =
            serde_json::from_str(frame).map_err(CodecError::MalformedEnvelope)?;

        let message = match envelope.message_type.as_str() {
            "join" => ClientMessage::Join(parse_payload(&envelope)?),
            "message" => ClientMessage::Chat(parse_payload(&envelope)?),
            "draw" => ClientMessage::Draw(parse_payload(&envelope)?),
            "path" => ClientMessage::Path(parse_payload(&envelope)?),
            "clear" => ClientMessage::Clear,
            _ => ClientMessage::Unrecognized(envelope.message_type),
        };
        Ok(message)
    }

    /// Wire type, used for logging and metric labels
    pub fn message_type(&self) -> &str {
        match self {
            ClientMessage::Join(_) => "join",
            ClientMessage::Chat(_) => "message",
            ClientMessage::Draw(_) => "draw",
            ClientMessage::Path(_) => "path",
            ClientMessage::Clear => "clear",
            ClientMessage::Unrecognized(message_type) => message_type,
        }
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(envelope: &Envelope) -> Result<T, CodecError> {
    T::deserialize(&envelope.payload).map_err(|source| CodecError::InvalidPayload {
        message_type: envelope.message_type.clone(),
        source,
    })
}

/// Stroke enriched with the identity of whoever drew it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawBroadcast {
    #[serde(flatten)]
    pub stroke: DrawPayload,
    #[serde(flatten)]
    pub player: PlayerInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathBroadcast {
    #[serde(flatten)]
    pub path: PathPayload,
    #[serde(flatten)]
    pub player: PlayerInfo,
}

/// Frames the server produces itself
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    PlayerJoin(PlayerInfo),
    PlayerLeave(PlayerInfo),
    Draw(DrawBroadcast),
    Path(PathBroadcast),
    Clear(PlayerInfo),
}

impl ServerMessage {
    pub fn draw(stroke: DrawPayload, player: PlayerInfo) -> Self {
        ServerMessage::Draw(DrawBroadcast { stroke, player })
    }

    pub fn path(path: PathPayload, player: PlayerInfo) -> Self {
        ServerMessage::Path(PathBroadcast { path, player })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ServerMessage::PlayerJoin(_) => EventKind::Join,
            ServerMessage::PlayerLeave(_) => EventKind::Leave,
            ServerMessage::Draw(_) => EventKind::Draw,
            ServerMessage::Path(_) => EventKind::Path,
            ServerMessage::Clear(_) => EventKind::Clear,
        }
    }

    /// Participant the message originates from
    pub fn origin(&self) -> &PlayerInfo {
        match self {
            ServerMessage::PlayerJoin(player)
            | ServerMessage::PlayerLeave(player)
            | ServerMessage::Clear(player) => player,
            ServerMessage::Draw(draw) => &draw.player,
            ServerMessage::Path(path) => &path.player,
        }
    }

    pub fn encode(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Encode)
    }

    /// Encodes the message into an event ready for the hub
    pub fn into_broadcast(self) -> Result<BroadcastEvent, CodecError> {
        let frame = self.encode()?;
        Ok(BroadcastEvent::new(
            self.kind(),
            Some(self.origin().id.clone()),
            frame,
        ))
    }
}
