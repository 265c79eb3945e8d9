#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::json;

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

/// Participant id used for a client's join
pub fn player_id(client: &str) -> String {
    format!("id-{}", client)
}

impl TestSetup {
    /// Send a raw frame from a client and wait for processing
    pub async fn send_raw(&mut self, client: &str, frame: String) {
        self.client(client)
            .inbound
            .as_ref()
            .expect("client already disconnected")
            .send(frame)
            .unwrap();
        self.settle().await;
    }

    /// Close a client's connection and wait for the session to clean up
    pub async fn disconnect(&mut self, client: &str) {
        self.client(client).inbound.take();
        self.settle().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_join(&mut self, client: &str) {
        let frame = json!({
            "type": "join",
            "payload": {
                "id": player_id(client),
                "playerName": client,
                "playerEmoji": "🎨"
            }
        });
        self.send_raw(client, frame.to_string()).await;
    }

    /// Joins every listed client, then discards the join notifications
    pub async fn join_all(&mut self, clients: &[&str]) {
        for client in clients {
            self.send_join(client).await;
        }
        self.clear_messages();
    }

    pub async fn send_chat(&mut self, client: &str, text: &str) -> String {
        let frame = json!({
            "type": "message",
            "payload": {
                "id": player_id(client),
                "playerName": client,
                "playerEmoji": "🎨",
                "message": text,
                "timestamp": "2024-05-01T12:00:00Z"
            }
        })
        .to_string();
        self.send_raw(client, frame.clone()).await;
        frame
    }

    pub async fn send_draw(&mut self, client: &str, x: f64, y: f64) {
        let frame = json!({
            "type": "draw",
            "payload": { "x": x, "y": y, "color": "#FF6B6B", "strokeWidth": 5 }
        });
        self.send_raw(client, frame.to_string()).await;
    }

    pub async fn send_path(&mut self, client: &str, points: &[(f64, f64)]) {
        let points: Vec<_> = points.iter().map(|(x, y)| json!({ "x": x, "y": y })).collect();
        let frame = json!({
            "type": "path",
            "payload": { "points": points, "color": "#4ECDC4", "strokeWidth": 3 }
        });
        self.send_raw(client, frame.to_string()).await;
    }

    pub async fn send_clear(&mut self, client: &str) {
        self.send_raw(client, json!({ "type": "clear" }).to_string())
            .await;
    }

    /// Drop every frame received so far by every client
    pub fn clear_messages(&mut self) {
        for client in self.clients.values_mut() {
            while client.outbound.try_recv().is_ok() {}
        }
    }
}
