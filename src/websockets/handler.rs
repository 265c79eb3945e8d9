use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::hub::{ConnectionHandle, HubHandle};
use crate::metrics::MetricsSink;
use crate::websockets::messages::ClientMessage;

use super::event_handlers::{
    ChatEventHandlers, DrawingEventHandlers, PlayerEventHandlers, RelayError,
};
use super::socket::{MessageHandler, SessionContext, SocketError};

/// Message handler turning client frames into hub operations
///
/// Delegates to specialized event handlers:
/// - PlayerEventHandlers: join, and the leave announced on disconnect
/// - ChatEventHandlers: chat messages
/// - DrawingEventHandlers: draw, path, clear
pub struct SessionEventHandler {
    hub: HubHandle,
    metrics: Arc<dyn MetricsSink>,
    player_handlers: PlayerEventHandlers,
    chat_handlers: ChatEventHandlers,
    drawing_handlers: DrawingEventHandlers,
}

impl SessionEventHandler {
    pub fn new(hub: HubHandle, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            player_handlers: PlayerEventHandlers::new(hub.clone()),
            chat_handlers: ChatEventHandlers::new(hub.clone()),
            drawing_handlers: DrawingEventHandlers::new(hub.clone(), Arc::clone(&metrics)),
            hub,
            metrics,
        }
    }

    async fn route(
        &self,
        session: &mut SessionContext,
        message: ClientMessage,
        frame: String,
    ) -> Result<(), RelayError> {
        match message {
            ClientMessage::Join(info) => self.player_handlers.handle_join(session, info).await,
            ClientMessage::Chat(payload) => {
                self.chat_handlers
                    .handle_chat_message(&payload, frame)
                    .await
            }
            ClientMessage::Draw(stroke) => self.drawing_handlers.handle_draw(session, stroke).await,
            ClientMessage::Path(path) => self.drawing_handlers.handle_path(session, path).await,
            ClientMessage::Clear => self.drawing_handlers.handle_clear(session).await,
            ClientMessage::Unrecognized(message_type) => {
                warn!(
                    connection_id = %session.connection_id,
                    message_type = %message_type,
                    "Unknown message type dropped"
                );
                self.metrics.websocket_error("unknown_message_type");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl MessageHandler for SessionEventHandler {
    async fn on_connect(&self, handle: ConnectionHandle) -> Result<(), SocketError> {
        let connection_id = handle.id();
        self.metrics.connection_opened();
        self.hub
            .register(handle)
            .await
            .map_err(|e| SocketError::RegistrationFailed(e.to_string()))?;
        info!(connection_id = %connection_id, "Session registered with hub");
        Ok(())
    }

    async fn handle_message(&self, session: &mut SessionContext, message: String) {
        debug!(
            connection_id = %session.connection_id,
            message = %message,
            "Received message"
        );

        let decoded = match ClientMessage::decode(&message) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(
                    connection_id = %session.connection_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                self.metrics.websocket_error(e.error_type());
                return;
            }
        };

        let message_type = decoded.message_type().to_string();
        self.metrics.message_received(&message_type);

        if let Err(e) = self.route(session, decoded, message).await {
            warn!(
                connection_id = %session.connection_id,
                message_type = %message_type,
                error = %e,
                "Failed to relay message"
            );
            self.metrics.websocket_error(e.error_type());
        }
    }

    async fn on_disconnect(&self, session: &SessionContext, error: Option<&SocketError>) {
        if let Some(e) = error {
            warn!(
                connection_id = %session.connection_id,
                error = %e,
                "Session ended with an error"
            );
            self.metrics.websocket_error(e.error_type());
        }

        if let Err(e) = self.player_handlers.handle_leave(session).await {
            warn!(
                connection_id = %session.connection_id,
                error = %e,
                "Failed to broadcast player leave"
            );
        }

        if let Err(e) = self.hub.unregister(session.connection_id).await {
            warn!(
                connection_id = %session.connection_id,
                error = %e,
                "Failed to unregister session"
            );
        }

        info!(
            connection_id = %session.connection_id,
            player_id = ?session.identity.as_ref().map(|info| info.id.as_str()),
            "Session disconnected"
        );
    }
}
