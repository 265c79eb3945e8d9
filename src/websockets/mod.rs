// Public API
pub use handler::SessionEventHandler;
pub use handlers::{list_players, render_metrics, websocket_handler};
pub use messages::{ClientMessage, CodecError, ServerMessage};
pub use socket::{MessageHandler, Session, SessionContext, SocketError, SocketWrapper};

// Internal modules
pub mod event_handlers;
mod handler;
mod handlers;
pub mod messages;
mod socket;
