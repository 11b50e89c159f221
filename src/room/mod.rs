// Public API
pub use models::{Room, SeatOutbox};
pub use registry::{InMemoryRoomRegistry, RoomRegistry, SharedRoom};
pub use service::RoomService;
pub use timer::TurnTimer;

// Internal modules
pub mod models;
mod registry;
mod service;
mod timer;
