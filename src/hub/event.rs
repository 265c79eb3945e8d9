use std::fmt;

/// Discriminator of a broadcast event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Join,
    Leave,
    Chat,
    Draw,
    Path,
    Clear,
    /// Kinds the hub does not know about yet; relayed without exclusion
    Other(String),
}

impl EventKind {
    /// Whether the originator must not receive its own event back.
    ///
    /// The originator has already rendered these locally.
    pub fn excludes_originator(&self) -> bool {
        matches!(
            self,
            EventKind::Join | EventKind::Leave | EventKind::Draw | EventKind::Path
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Join => "join",
            EventKind::Leave => "leave",
            EventKind::Chat => "chat",
            EventKind::Draw => "draw",
            EventKind::Path => "path",
            EventKind::Clear => "clear",
            EventKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One already-encoded frame to fan out, plus what the hub needs to filter it.
///
/// Consumed by a single dispatch pass and then dropped.
#[derive(Debug, Clone)]
pub struct BroadcastEvent {
    pub kind: EventKind,
    /// Participant id of the sender, for kinds that carry one
    pub origin: Option<String>,
    /// Encoded frame delivered verbatim to every recipient
    pub frame: String,
}

impl BroadcastEvent {
    pub fn new(kind: EventKind, origin: Option<String>, frame: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            frame: frame.into(),
        }
    }

    /// Whether delivery to a participant with `participant_id` must be skipped.
    ///
    /// An empty origin matches nobody, otherwise every unjoined entry (whose id
    /// is still empty) would be treated as the sender.
    pub fn is_echo_to(&self, participant_id: &str) -> bool {
        if !self.kind.excludes_originator() {
            return false;
        }
        match self.origin.as_deref() {
            Some(origin) if !origin.is_empty() => origin == participant_id,
            _ => false,
        }
    }
}
