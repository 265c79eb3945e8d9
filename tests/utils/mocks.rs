#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

use polydraw::metrics::MetricsSink;
use polydraw::websockets::{SocketError, SocketWrapper};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// In-memory socket: the test pushes client frames in and reads server frames out
pub struct MockSocket {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
    fail_sends: bool,
}

impl MockSocket {
    /// Returns the socket, the client-side sender and the client-side receiver
    pub fn new() -> (
        Self,
        mpsc::UnboundedSender<String>,
        mpsc::UnboundedReceiver<String>,
    ) {
        let (client_tx, inbound) = mpsc::unbounded_channel();
        let (outbound, client_rx) = mpsc::unbounded_channel();
        let socket = Self {
            inbound,
            outbound,
            fail_sends: false,
        };
        (socket, client_tx, client_rx)
    }

    /// Every write fails, as with a peer whose transport died
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }
}

#[async_trait]
impl SocketWrapper for MockSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        if self.fail_sends {
            return Err(SocketError::SendFailed("broken pipe".to_string()));
        }
        self.outbound
            .send(message)
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        Ok(self.inbound.recv().await)
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MockMetrics {
    counters: Mutex<HashMap<String, u64>>,
    gauges: Mutex<HashMap<String, usize>>,
}

impl MockMetrics {
    pub fn count(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or_default()
    }

    pub fn gauge(&self, name: &str) -> Option<usize> {
        self.gauges.lock().unwrap().get(name).copied()
    }

    fn add(&self, name: &str, amount: u64) {
        *self
            .counters
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default() += amount;
    }

    fn set(&self, name: &str, value: usize) {
        self.gauges.lock().unwrap().insert(name.to_string(), value);
    }
}

impl MetricsSink for MockMetrics {
    fn connection_opened(&self) {
        self.add("connections_total", 1);
    }
    fn active_connections(&self, count: usize) {
        self.set("connections_active", count);
    }
    fn message_received(&self, message_type: &str) {
        self.add(&format!("received:{}", message_type), 1);
    }
    fn messages_sent(&self, count: usize) {
        self.add("messages_sent", count as u64);
    }
    fn websocket_error(&self, error_type: &str) {
        self.add(&format!("error:{}", error_type), 1);
    }
    fn player_joined(&self) {
        self.add("players_joined", 1);
    }
    fn player_left(&self) {
        self.add("players_left", 1);
    }
    fn active_players(&self, count: usize) {
        self.set("players_active", count);
    }
    fn draw_event(&self) {
        self.add("draw_events", 1);
    }
    fn path_event(&self, points: usize) {
        self.add("path_events", 1);
        self.add("path_points", points as u64);
    }
    fn clear_event(&self) {
        self.add("clear_events", 1);
    }
    fn hub_mailbox_depth(&self, depth: usize) {
        self.set("hub_mailbox_depth", depth);
    }
}
