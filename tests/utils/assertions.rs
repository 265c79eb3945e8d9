//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a mut TestSetup,
    clients: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for specific clients
    pub fn for_clients(setup: &'a mut TestSetup, clients: Vec<&'a str>) -> Self {
        Self { setup, clients }
    }

    /// Assert that every client received exactly one frame of `expected_type`
    /// (consumes it) and that all of them received the same payload
    pub fn received_message_type(self, expected_type: &str) -> Value {
        let mut payloads = vec![];

        for client in &self.clients {
            let frame = self.setup.client(client).outbound.try_recv().ok();
            let frame = frame.unwrap_or_else(|| panic!("{} should have received a message", client));

            let message: Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(
                message["type"], expected_type,
                "{} received wrong message type",
                client
            );
            payloads.push(message["payload"].clone());
        }

        for (i, payload) in payloads.iter().enumerate().skip(1) {
            assert_eq!(
                payload, &payloads[0],
                "{} payload differs from {}",
                self.clients[i], self.clients[0]
            );
        }

        payloads.into_iter().next().unwrap_or(Value::Null)
    }

    /// Assert that every client received exactly this raw frame (consumes it)
    pub fn received_frame(self, expected: &str) {
        for client in &self.clients {
            let frame = self.setup.client(client).outbound.try_recv().ok();
            assert_eq!(
                frame.as_deref(),
                Some(expected),
                "{} did not receive the expected frame",
                client
            );
        }
    }

    /// Assert that clients have nothing waiting
    pub fn received_no_messages(self) {
        for client in &self.clients {
            let frame = self.setup.client(client).outbound.try_recv().ok();
            assert!(
                frame.is_none(),
                "{} should not have received any messages, got {:?}",
                client,
                frame
            );
        }
    }
}
