// Public API
pub use handler::websocket_handler;
pub use messages::{ClientMessage, RevealPayload, ServerMessage, StateSnapshot};
pub use socket::{normalize_code, Connection, SocketError, SocketWrapper};

// Internal modules
mod handler;
pub mod messages;
mod socket;
