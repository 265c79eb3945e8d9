use tracing::{debug, info};

use crate::{
    hub::{HubHandle, PlayerInfo},
    websockets::{messages::ServerMessage, socket::SessionContext},
};

use super::RelayError;

pub struct PlayerEventHandlers {
    hub: HubHandle,
}

impl PlayerEventHandlers {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }

    /// Records the announced identity, then tells everyone else about it.
    ///
    /// Nothing is stored or announced when the hub rejects the identity, so
    /// the session never claims a join the roster does not have.
    pub async fn handle_join(
        &self,
        session: &mut SessionContext,
        info: PlayerInfo,
    ) -> Result<(), RelayError> {
        info!(
            connection_id = %session.connection_id,
            player_id = %info.id,
            player_name = %info.player_name,
            "Join received"
        );

        self.hub
            .update_identity(session.connection_id, info.clone())
            .await?;
        session.identity = Some(info.clone());

        let event = ServerMessage::PlayerJoin(info).into_broadcast()?;
        self.hub.broadcast(event).await?;
        Ok(())
    }

    /// Announces the departure of a joined session; unjoined sessions leave silently
    pub async fn handle_leave(&self, session: &SessionContext) -> Result<(), RelayError> {
        let Some(info) = session.joined_identity() else {
            debug!(
                connection_id = %session.connection_id,
                "Session left before joining, no leave broadcast"
            );
            return Ok(());
        };

        info!(
            connection_id = %session.connection_id,
            player_id = %info.id,
            "Broadcasting player leave"
        );

        let event = ServerMessage::PlayerLeave(info.clone()).into_broadcast()?;
        self.hub.broadcast(event).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{ConnectionHandle, Hub};
    use crate::metrics::NoopMetrics;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_join_updates_identity_and_skips_self() {
        let (hub, _task) = Hub::spawn(16, Arc::new(NoopMetrics));
        let (me, mut my_rx) = ConnectionHandle::channel(8);
        let (other, mut other_rx) = ConnectionHandle::channel(8);
        let mut session = SessionContext::new(me.id());
        hub.register(me).await.unwrap();
        hub.register(other).await.unwrap();

        let handlers = PlayerEventHandlers::new(hub.clone());
        handlers
            .handle_join(&mut session, PlayerInfo::new("p1", "Al", "🙂"))
            .await
            .unwrap();

        assert_eq!(hub.active_roster().await.unwrap().len(), 1);
        assert!(session.joined_identity().is_some());
        assert!(my_rx.try_recv().is_err());
        assert!(other_rx.try_recv().unwrap().contains("player_join"));
    }

    #[tokio::test]
    async fn test_leave_without_join_broadcasts_nothing() {
        let (hub, _task) = Hub::spawn(16, Arc::new(NoopMetrics));
        let (me, _my_rx) = ConnectionHandle::channel(8);
        let (other, mut other_rx) = ConnectionHandle::channel(8);
        let session = SessionContext::new(me.id());
        hub.register(me).await.unwrap();
        hub.register(other).await.unwrap();

        PlayerEventHandlers::new(hub.clone())
            .handle_leave(&session)
            .await
            .unwrap();
        let _ = hub.active_roster().await.unwrap();

        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_rejected_by_hub_is_not_announced() {
        let (hub, _task) = Hub::spawn(16, Arc::new(NoopMetrics));
        let (evicted, _evicted_rx) = ConnectionHandle::channel(8);
        let (other, mut other_rx) = ConnectionHandle::channel(8);
        let mut session = SessionContext::new(evicted.id());
        // Only the other peer is known to the hub
        hub.register(other).await.unwrap();

        let err = PlayerEventHandlers::new(hub.clone())
            .handle_join(&mut session, PlayerInfo::new("p1", "Al", "🙂"))
            .await
            .unwrap_err();
        let _ = hub.active_roster().await.unwrap();

        assert_eq!(err.error_type(), "unknown_connection");
        assert!(session.identity.is_none());
        assert!(other_rx.try_recv().is_err());
        assert!(hub.active_roster().await.unwrap().is_empty());
    }
}
