use tracing::info;

use crate::{
    hub::{BroadcastEvent, EventKind, HubHandle},
    websockets::messages::ChatPayload,
};

use super::RelayError;

pub struct ChatEventHandlers {
    hub: HubHandle,
}

impl ChatEventHandlers {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }

    /// Relays the chat frame unchanged to every registered connection, sender included
    pub async fn handle_chat_message(
        &self,
        payload: &ChatPayload,
        frame: String,
    ) -> Result<(), RelayError> {
        info!(
            player_id = %payload.id,
            player_name = %payload.player_name,
            "Relaying chat message"
        );

        let event = BroadcastEvent::new(EventKind::Chat, Some(payload.id.clone()), frame);
        self.hub.broadcast(event).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{ConnectionHandle, Hub};
    use crate::metrics::NoopMetrics;
    use chrono::Utc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_chat_echoes_back_to_sender() {
        let (hub, _task) = Hub::spawn(16, Arc::new(NoopMetrics));
        let (sender, mut sender_rx) = ConnectionHandle::channel(8);
        hub.register(sender).await.unwrap();

        let payload = ChatPayload {
            id: "p1".to_string(),
            player_name: "Al".to_string(),
            player_emoji: "🙂".to_string(),
            message: "hi".to_string(),
            timestamp: Utc::now(),
        };
        ChatEventHandlers::new(hub.clone())
            .handle_chat_message(&payload, "raw-frame".to_string())
            .await
            .unwrap();
        let _ = hub.active_roster().await.unwrap();

        assert_eq!(sender_rx.try_recv().unwrap(), "raw-frame");
    }
}
