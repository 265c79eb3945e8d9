// Public API
pub use actor::{Hub, HubHandle};
pub use errors::HubError;
pub use event::{BroadcastEvent, EventKind};
pub use participant::{ConnectionHandle, ConnectionId, DeliveryFailed, Participant, PlayerInfo};
pub use registry::{DispatchOutcome, Eviction, Registry};

// Internal modules
mod actor;
mod errors;
mod event;
mod participant;
mod registry;
