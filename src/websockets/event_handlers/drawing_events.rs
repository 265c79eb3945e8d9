use std::sync::Arc;
use tracing::debug;

use crate::{
    hub::{HubHandle, PlayerInfo},
    metrics::MetricsSink,
    websockets::{
        messages::{DrawPayload, PathPayload, ServerMessage},
        socket::SessionContext,
    },
};

use super::RelayError;

/// Relays strokes and canvas clears, stamped with the sender's identity
pub struct DrawingEventHandlers {
    hub: HubHandle,
    metrics: Arc<dyn MetricsSink>,
}

impl DrawingEventHandlers {
    pub fn new(hub: HubHandle, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { hub, metrics }
    }

    pub async fn handle_draw(
        &self,
        session: &SessionContext,
        stroke: DrawPayload,
    ) -> Result<(), RelayError> {
        let player = Self::identity(session, "draw")?;
        self.metrics.draw_event();
        self.relay(ServerMessage::draw(stroke, player)).await
    }

    pub async fn handle_path(
        &self,
        session: &SessionContext,
        path: PathPayload,
    ) -> Result<(), RelayError> {
        let player = Self::identity(session, "path")?;
        debug!(
            player_id = %player.id,
            points = path.points.len(),
            "Relaying path"
        );
        self.metrics.path_event(path.points.len());
        self.relay(ServerMessage::path(path, player)).await
    }

    pub async fn handle_clear(&self, session: &SessionContext) -> Result<(), RelayError> {
        let player = Self::identity(session, "clear")?;
        debug!(player_id = %player.id, "Relaying canvas clear");
        self.metrics.clear_event();
        self.relay(ServerMessage::Clear(player)).await
    }

    fn identity(
        session: &SessionContext,
        message_type: &'static str,
    ) -> Result<PlayerInfo, RelayError> {
        session
            .joined_identity()
            .cloned()
            .ok_or(RelayError::NotJoined { message_type })
    }

    async fn relay(&self, message: ServerMessage) -> Result<(), RelayError> {
        self.hub.broadcast(message.into_broadcast()?).await?;
        Ok(())
    }
}
