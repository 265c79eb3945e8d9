#![allow(dead_code)] // Test utilities may not all be used in every test

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use polydraw::{
    hub::{Hub, HubHandle},
    websockets::{Session, SessionEventHandler, SocketError},
};

use super::mocks::{MockMetrics, MockSocket};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Test side of one connected client
pub struct TestClient {
    /// Frames the client sends; dropping it closes the connection
    pub inbound: Option<mpsc::UnboundedSender<String>>,
    /// Frames the server wrote to the client
    pub outbound: mpsc::UnboundedReceiver<String>,
    pub session_task: JoinHandle<Result<(), SocketError>>,
}

pub struct TestSetup {
    pub hub: HubHandle,
    pub metrics: Arc<MockMetrics>,
    pub clients: HashMap<String, TestClient>,
}

pub struct TestSetupBuilder {
    clients: Vec<String>,
    broken_clients: Vec<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            clients: vec![],
            broken_clients: vec![],
        }
    }

    pub fn with_clients(mut self, clients: Vec<&str>) -> Self {
        self.clients = clients.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_clients(self) -> Self {
        self.with_clients(vec!["alice", "bob"])
    }

    pub fn with_three_clients(self) -> Self {
        self.with_clients(vec!["alice", "bob", "carol"])
    }

    /// Client whose socket fails every write
    pub fn with_broken_client(mut self, client: &str) -> Self {
        self.broken_clients.push(client.to_string());
        self
    }

    pub async fn build(self) -> TestSetup {
        let metrics = Arc::new(MockMetrics::default());
        let (hub, _hub_task) = Hub::spawn(64, metrics.clone());

        let mut clients = HashMap::new();
        let names = self.clients.iter().chain(self.broken_clients.iter());
        for name in names {
            let (socket, inbound, outbound) = MockSocket::new();
            let socket = if self.broken_clients.contains(name) {
                socket.failing_sends()
            } else {
                socket
            };

            let handler = Arc::new(SessionEventHandler::new(hub.clone(), metrics.clone()));
            let session = Session::new(Box::new(socket), handler, 64);
            let session_task = tokio::spawn(session.run());

            clients.insert(
                name.clone(),
                TestClient {
                    inbound: Some(inbound),
                    outbound,
                    session_task,
                },
            );
        }

        let setup = TestSetup {
            hub,
            metrics,
            clients,
        };
        setup.settle().await;
        setup
    }
}

impl TestSetup {
    /// Wait until sessions and the hub have processed everything sent so far
    pub async fn settle(&self) {
        sleep(Duration::from_millis(20)).await;
        let _ = self.hub.active_roster().await;
    }

    pub fn client(&mut self, name: &str) -> &mut TestClient {
        self.clients
            .get_mut(name)
            .unwrap_or_else(|| panic!("unknown client {}", name))
    }
}
