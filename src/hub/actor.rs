use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::errors::HubError;
use super::event::BroadcastEvent;
use super::participant::{ConnectionHandle, ConnectionId, Participant, PlayerInfo};
use super::registry::Registry;
use crate::metrics::MetricsSink;

/// Requests accepted by the hub mailbox
#[derive(Debug)]
enum HubCommand {
    Register(ConnectionHandle),
    Unregister(ConnectionId),
    UpdateIdentity {
        connection_id: ConnectionId,
        info: PlayerInfo,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    Broadcast(BroadcastEvent),
    ActiveRoster(oneshot::Sender<Vec<PlayerInfo>>),
}

/// Owner of the registry.
///
/// Every registry read and write happens inside `run`, one command at a time,
/// so the registry needs no lock.
pub struct Hub {
    registry: Registry,
    mailbox: mpsc::Receiver<HubCommand>,
    metrics: Arc<dyn MetricsSink>,
}

impl Hub {
    /// Creates the hub and the handle used to talk to it.
    ///
    /// `mailbox_capacity` bounds the number of pending commands; senders wait
    /// once it is full.
    pub fn new(mailbox_capacity: usize, metrics: Arc<dyn MetricsSink>) -> (Self, HubHandle) {
        let (sender, mailbox) = mpsc::channel(mailbox_capacity);
        let hub = Self {
            registry: Registry::new(),
            mailbox,
            metrics,
        };
        (hub, HubHandle { sender })
    }

    /// Creates the hub and runs it on its own task
    pub fn spawn(
        mailbox_capacity: usize,
        metrics: Arc<dyn MetricsSink>,
    ) -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(mailbox_capacity, metrics);
        (handle, tokio::spawn(hub.run()))
    }

    /// Processes commands until every handle has been dropped
    pub async fn run(mut self) {
        info!("Hub started");

        while let Some(command) = self.mailbox.recv().await {
            self.handle_command(command);
            self.metrics.hub_mailbox_depth(self.mailbox.len());
        }

        info!(
            remaining_connections = self.registry.len(),
            "Hub stopped - all handles dropped"
        );
    }

    fn handle_command(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(handle) => self.register(handle),
            HubCommand::Unregister(connection_id) => self.unregister(connection_id),
            HubCommand::UpdateIdentity {
                connection_id,
                info,
                reply,
            } => {
                let result = self.update_identity(connection_id, info);
                if reply.send(result).is_err() {
                    debug!(
                        connection_id = %connection_id,
                        "Identity requester went away before the reply"
                    );
                }
            }
            HubCommand::Broadcast(event) => self.broadcast(event),
            HubCommand::ActiveRoster(reply) => {
                if reply.send(self.registry.active_roster()).is_err() {
                    debug!("Roster requester went away before the reply");
                }
            }
        }
    }

    fn register(&mut self, handle: ConnectionHandle) {
        let connection_id = handle.id();
        self.registry.register(handle);
        info!(
            connection_id = %connection_id,
            connections = self.registry.len(),
            "Connection registered"
        );
        self.report_gauges();
    }

    fn unregister(&mut self, connection_id: ConnectionId) {
        match self.registry.unregister(connection_id) {
            Some(participant) => {
                info!(
                    connection_id = %connection_id,
                    player_id = %participant.info.id,
                    connections = self.registry.len(),
                    "Connection unregistered"
                );
                self.record_departure(&participant);
                self.report_gauges();
            }
            None => {
                debug!(
                    connection_id = %connection_id,
                    "Unregister for unknown connection ignored"
                );
            }
        }
    }

    fn update_identity(
        &mut self,
        connection_id: ConnectionId,
        info: PlayerInfo,
    ) -> Result<(), HubError> {
        let player_id = info.id.clone();
        match self.registry.update_identity(connection_id, info) {
            Ok(joined) => {
                info!(
                    connection_id = %connection_id,
                    player_id = %player_id,
                    joined,
                    "Participant identity updated"
                );
                if joined {
                    self.metrics.player_joined();
                    self.report_gauges();
                }
                Ok(())
            }
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    player_id = %player_id,
                    error = %e,
                    "Identity update dropped"
                );
                Err(e)
            }
        }
    }

    fn broadcast(&mut self, event: BroadcastEvent) {
        let outcome = self.registry.dispatch(&event);

        debug!(
            kind = %event.kind,
            origin = ?event.origin,
            delivered = outcome.delivered,
            skipped = outcome.skipped,
            evicted = outcome.evicted.len(),
            "Broadcast dispatched"
        );

        self.metrics.messages_sent(outcome.delivered);

        if outcome.evicted.is_empty() {
            return;
        }

        for eviction in &outcome.evicted {
            warn!(
                connection_id = %eviction.participant.connection_id(),
                player_id = %eviction.participant.info.id,
                kind = %event.kind,
                reason = eviction.reason.error_type(),
                "Evicted connection after failed delivery"
            );
            self.metrics.websocket_error(eviction.reason.error_type());
            self.record_departure(&eviction.participant);
        }
        self.report_gauges();
    }

    fn record_departure(&self, participant: &Participant) {
        if participant.is_joined() {
            self.metrics.player_left();
        }
    }

    fn report_gauges(&self) {
        self.metrics.active_connections(self.registry.len());
        self.metrics.active_players(self.registry.joined_count());
    }
}

/// Cloneable client of the hub mailbox.
///
/// Every method waits for mailbox space; none of them touch the registry.
#[derive(Debug, Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub async fn register(&self, handle: ConnectionHandle) -> Result<(), HubError> {
        self.send(HubCommand::Register(handle)).await
    }

    pub async fn unregister(&self, connection_id: ConnectionId) -> Result<(), HubError> {
        self.send(HubCommand::Unregister(connection_id)).await
    }

    /// Sets the identity of a registered connection.
    ///
    /// Fails with `UnknownConnection` when the hub no longer knows the
    /// connection, for instance after it was evicted.
    pub async fn update_identity(
        &self,
        connection_id: ConnectionId,
        info: PlayerInfo,
    ) -> Result<(), HubError> {
        let (reply, receiver) = oneshot::channel();
        self.send(HubCommand::UpdateIdentity {
            connection_id,
            info,
            reply,
        })
        .await?;
        receiver.await.map_err(|_| HubError::MailboxClosed)?
    }

    pub async fn broadcast(&self, event: BroadcastEvent) -> Result<(), HubError> {
        self.send(HubCommand::Broadcast(event)).await
    }

    /// Snapshot of joined participants, taken after every earlier command has applied
    pub async fn active_roster(&self) -> Result<Vec<PlayerInfo>, HubError> {
        let (reply, receiver) = oneshot::channel();
        self.send(HubCommand::ActiveRoster(reply)).await?;
        receiver.await.map_err(|_| HubError::MailboxClosed)
    }

    async fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| HubError::MailboxClosed)
    }
}
