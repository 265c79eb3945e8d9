use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::hub::{ConnectionHandle, ConnectionId, PlayerInfo};

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next text message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// What a session knows about itself
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub connection_id: ConnectionId,
    /// Identity announced by the last join frame, if any
    pub identity: Option<PlayerInfo>,
}

impl SessionContext {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            identity: None,
        }
    }

    /// Identity, only once the join handshake carried all three fields
    pub fn joined_identity(&self) -> Option<&PlayerInfo> {
        self.identity.as_ref().filter(|info| info.is_complete())
    }
}

/// Handler for the lifecycle and incoming frames of one session
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Called once before any frame is read; the handle is the session's only outbound sender
    async fn on_connect(&self, handle: ConnectionHandle) -> Result<(), SocketError>;

    /// Handle an incoming message from the client
    async fn handle_message(&self, session: &mut SessionContext, message: String);

    /// Called once when the session ends, whatever the reason; `error` is why
    /// the loop stopped, if it did not end cleanly
    async fn on_disconnect(&self, session: &SessionContext, error: Option<&SocketError>);
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),
}

impl SocketError {
    /// Label used when counting this error
    pub fn error_type(&self) -> &'static str {
        match self {
            SocketError::SendFailed(_) => "write_failed",
            SocketError::ReceiveFailed(_) => "read_failed",
            SocketError::RegistrationFailed(_) => "hub_unavailable",
        }
    }
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(_)) => continue, // Ignore binary/ping/pong
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
                None => return Ok(None), // Connection closed
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Session represents one managed WebSocket connection.
///
/// It reads client frames and hands them to the message handler, and writes
/// whatever the hub enqueues on its outbound receiver.
pub struct Session {
    context: SessionContext,
    handle: Option<ConnectionHandle>,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::Receiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Session {
    /// `outbound_capacity` bounds the frames the hub may queue for this peer
    /// before it is treated as stalled and evicted
    pub fn new(
        socket: Box<dyn SocketWrapper>,
        message_handler: Arc<dyn MessageHandler>,
        outbound_capacity: usize,
    ) -> Self {
        let (handle, outbound_receiver) = ConnectionHandle::channel(outbound_capacity);
        Self {
            context: SessionContext::new(handle.id()),
            handle: Some(handle),
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.context.connection_id
    }

    /// Run the session until disconnect.
    ///
    /// Once registered, the disconnect hook and socket close always run, even
    /// when the loop exits with an error.
    pub async fn run(mut self) -> Result<(), SocketError> {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.message_handler.on_connect(handle).await {
                let _ = self.socket.close().await;
                return Err(e);
            }
        }

        let result = self.pump().await;

        self.message_handler
            .on_disconnect(&self.context, result.as_ref().err())
            .await;
        let _ = self.socket.close().await;
        result
    }

    async fn pump(&mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                // Handle outbound messages (from the hub to client)
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => self.socket.send_message(message).await?,
                        None => return Ok(()), // Hub dropped us (evicted or shutting down)
                    }
                }

                // Handle inbound messages (from client to the hub)
                msg = self.socket.receive_message() => {
                    match msg? {
                        Some(message) => {
                            self.message_handler
                                .handle_message(&mut self.context, message)
                                .await;
                        }
                        None => return Ok(()), // Client disconnected
                    }
                }
            }
        }
    }
}
