use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::models::Room;
use crate::shared::AppError;

/// A room plus its lock. Every handler — client message or timer callback —
/// takes the lock, runs to completion, and releases; room state never sees
/// two handlers interleaved.
pub type SharedRoom = Arc<tokio::sync::Mutex<Room>>;

/// Lookup table of live rooms, keyed by normalized room code. The service
/// owns a handle to this; game logic itself never reaches into it.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    async fn get_room(&self, code: &str) -> Option<SharedRoom>;

    /// Registers a room under its code; fails if the code is taken.
    async fn insert_room(&self, code: &str, room: SharedRoom) -> Result<(), AppError>;

    /// Removes a room. Safe to call for a code that is already gone.
    async fn remove_room(&self, code: &str);
}

/// Process-local registry. Restarting the server wipes all rooms; there is
/// deliberately no persistence behind this.
pub struct InMemoryRoomRegistry {
    rooms: Mutex<HashMap<String, SharedRoom>>,
}

impl Default for InMemoryRoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn get_room(&self, code: &str) -> Option<SharedRoom> {
        let rooms = self.rooms.lock().unwrap();
        rooms.get(code).cloned()
    }

    async fn insert_room(&self, code: &str, room: SharedRoom) -> Result<(), AppError> {
        let mut rooms = self.rooms.lock().unwrap();
        if rooms.contains_key(code) {
            debug!(room_code = %code, "room code collision");
            return Err(AppError::RoomExists(code.to_string()));
        }
        rooms.insert(code.to_string(), room);
        debug!(room_code = %code, "room registered");
        Ok(())
    }

    async fn remove_room(&self, code: &str) {
        let mut rooms = self.rooms.lock().unwrap();
        rooms.remove(code);
        debug!(room_code = %code, "room removed");
    }
}
