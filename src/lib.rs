// Library crate for the Gin Rummy game server
// This file exposes the public API for integration tests

pub mod config;
pub mod game;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::ServerConfig;
pub use game::{Action, Card, MatchState, Phase, Rank, Suit};
pub use room::{InMemoryRoomRegistry, Room, RoomRegistry, RoomService, SeatOutbox};
pub use shared::{AppError, AppState};
pub use websockets::{ClientMessage, ServerMessage};
