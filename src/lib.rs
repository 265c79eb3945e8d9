// Library crate for the Polydraw relay server
// This file exposes the public API for integration tests

pub mod config;
pub mod hub;
pub mod metrics;
pub mod routes;
pub mod shared;
pub mod telemetry;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::ServerConfig;
pub use hub::{BroadcastEvent, ConnectionHandle, EventKind, Hub, HubHandle, PlayerInfo};
pub use shared::{AppError, AppState};
pub use websockets::{ClientMessage, ServerMessage, Session, SessionEventHandler};
