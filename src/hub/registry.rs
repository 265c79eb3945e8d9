use std::collections::HashMap;
use tracing::{debug, warn};

use super::errors::HubError;
use super::event::BroadcastEvent;
use super::participant::{ConnectionHandle, ConnectionId, DeliveryFailed, Participant, PlayerInfo};

/// Result of a single dispatch pass
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Connections the frame was handed to
    pub delivered: usize,
    /// Connections skipped because they originated the event
    pub skipped: usize,
    /// Participants removed because their outbound queue was gone or full
    pub evicted: Vec<Eviction>,
}

/// A participant removed during dispatch, and why
#[derive(Debug)]
pub struct Eviction {
    pub participant: Participant,
    pub reason: DeliveryFailed,
}

/// Authoritative map of live connections to participants.
///
/// Not synchronized: it is owned by exactly one hub task.
#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<ConnectionId, Participant>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh, unjoined entry for `handle`.
    ///
    /// Registering an id that is already present replaces the entry, so a
    /// handle never maps to two participants.
    pub fn register(&mut self, handle: ConnectionHandle) {
        let connection_id = handle.id();
        if self
            .participants
            .insert(connection_id, Participant::new(handle))
            .is_some()
        {
            warn!(connection_id = %connection_id, "Connection registered twice, entry reset");
        }
    }

    /// Removes the entry for `connection_id`, returning it if it was present
    pub fn unregister(&mut self, connection_id: ConnectionId) -> Option<Participant> {
        self.participants.remove(&connection_id)
    }

    /// Sets the identity fields of a registered connection.
    ///
    /// Returns whether the participant transitioned from unjoined to joined.
    pub fn update_identity(
        &mut self,
        connection_id: ConnectionId,
        info: PlayerInfo,
    ) -> Result<bool, HubError> {
        let participant = self
            .participants
            .get_mut(&connection_id)
            .ok_or(HubError::UnknownConnection(connection_id))?;

        let was_joined = participant.is_joined();
        participant.info = info;
        Ok(!was_joined && participant.is_joined())
    }

    /// Fans `event` out to every entry, skipping echoes to the originator and
    /// evicting entries whose delivery fails.
    pub fn dispatch(&mut self, event: &BroadcastEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let mut failed = Vec::new();

        for (connection_id, participant) in &self.participants {
            if event.is_echo_to(&participant.info.id) {
                outcome.skipped += 1;
                continue;
            }

            match participant.handle.deliver(event.frame.clone()) {
                Ok(()) => outcome.delivered += 1,
                Err(reason) => {
                    debug!(
                        connection_id = %connection_id,
                        kind = %event.kind,
                        reason = ?reason,
                        "Delivery failed, evicting connection"
                    );
                    failed.push((*connection_id, reason));
                }
            }
        }

        outcome.evicted = failed
            .into_iter()
            .filter_map(|(connection_id, reason)| {
                self.participants
                    .remove(&connection_id)
                    .map(|participant| Eviction {
                        participant,
                        reason,
                    })
            })
            .collect();

        outcome
    }

    /// Snapshot of the identities of all joined participants
    pub fn active_roster(&self) -> Vec<PlayerInfo> {
        self.participants
            .values()
            .filter(|p| p.is_joined())
            .map(|p| p.info.clone())
            .collect()
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.participants.contains_key(&connection_id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn joined_count(&self) -> usize {
        self.participants.values().filter(|p| p.is_joined()).count()
    }
}
