use std::sync::Arc;

use ginrummy::game::{Action, Card, MatchState, Seat};
use ginrummy::room::{InMemoryRoomRegistry, RoomRegistry, RoomService, SeatOutbox, SharedRoom};

use super::outbox::RecordingOutbox;

pub const CODE: &str = "CODE";

/// A two-seat room driven end to end through the room service, with
/// recording outboxes standing in for the WebSocket connections.
pub struct TestRoom {
    pub service: Arc<RoomService>,
    pub registry: Arc<InMemoryRoomRegistry>,
    pub host: Arc<RecordingOutbox>,
    pub guest: Arc<RecordingOutbox>,
}

impl TestRoom {
    /// Creates the room and seats both players; no match yet.
    pub async fn seated(turn_ms: u64) -> Self {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let service = Arc::new(RoomService::new(registry.clone(), turn_ms));
        let host = RecordingOutbox::new();
        let guest = RecordingOutbox::new();

        service
            .create_room(host.clone(), CODE, 2, 10)
            .await
            .expect("room created");
        service
            .join_room(guest.clone(), CODE)
            .await
            .expect("room joined");

        Self {
            service,
            registry,
            host,
            guest,
        }
    }

    /// Seats both players and starts the first round, clearing the lobby
    /// traffic so tests only see in-game messages.
    pub async fn started(turn_ms: u64) -> Self {
        let room = Self::seated(turn_ms).await;
        let host_outbox: Arc<dyn SeatOutbox> = room.host.clone();
        room.service.start_game(CODE, &host_outbox).await;
        room.clear_all();
        room
    }

    pub fn clear_all(&self) {
        self.host.clear();
        self.guest.clear();
    }

    pub fn outbox_for(&self, seat: Seat) -> Arc<RecordingOutbox> {
        if seat == 0 {
            self.host.clone()
        } else {
            self.guest.clone()
        }
    }

    pub async fn act(&self, seat: Seat, action: Action) {
        let outbox: Arc<dyn SeatOutbox> = self.outbox_for(seat);
        self.service.handle_action(CODE, &outbox, action).await;
    }

    pub async fn disconnect(&self, seat: Seat) {
        let outbox: Arc<dyn SeatOutbox> = self.outbox_for(seat);
        self.service.handle_disconnect(CODE, &outbox).await;
    }

    pub async fn room(&self) -> SharedRoom {
        self.registry.get_room(CODE).await.expect("room exists")
    }

    pub async fn current_player(&self) -> Seat {
        let room = self.room().await;
        let room = room.lock().await;
        room.game.as_ref().expect("game running").round.current_player
    }

    /// Mutates the live match under the room lock, for scripting exact
    /// hands, decks, and phases.
    pub async fn with_game<F>(&self, mutate: F)
    where
        F: FnOnce(&mut MatchState),
    {
        let room = self.room().await;
        let mut room = room.lock().await;
        mutate(room.game.as_mut().expect("game running"));
    }

    pub async fn total_cards(&self) -> usize {
        let room = self.room().await;
        let room = room.lock().await;
        room.game.as_ref().expect("game running").round.total_cards()
    }
}

pub fn cards(ids: &[&str]) -> Vec<Card> {
    ids.iter()
        .map(|id| Card::from_id(id).expect("valid card id"))
        .collect()
}

pub fn ids(cards: &[Card]) -> Vec<String> {
    cards.iter().map(Card::id).collect()
}
