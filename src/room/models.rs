use std::sync::Arc;

use rand::Rng;
use tokio::sync::mpsc;

use super::timer::TurnTimer;
use crate::game::{MatchState, Seat};

/// Capability to push one serialized message to a connected seat.
///
/// The match engine and room service never touch sockets directly; the
/// WebSocket layer implements this over its outbound channel and tests
/// substitute a recording implementation.
pub trait SeatOutbox: Send + Sync {
    /// Delivers a message if the connection is still open. Undeliverable
    /// messages are dropped; the disconnect path handles cleanup.
    fn send_text(&self, text: String);
}

impl SeatOutbox for mpsc::UnboundedSender<String> {
    fn send_text(&self, text: String) {
        let _ = self.send(text);
    }
}

/// One game room: the connected seats, the match they are playing, and the
/// turn-timer bookkeeping. All mutation happens under the room's lock, one
/// handler at a time.
pub struct Room {
    pub code: String,
    pub players_needed: usize,
    pub target_score: u32,
    /// Live connections in seat order; the index is the protocol `playerId`.
    pub seats: Vec<Arc<dyn SeatOutbox>>,
    pub game: Option<MatchState>,
    pub timer: TurnTimer,
    /// Seat that deals first in the next round. Alternates each round and is
    /// re-randomized when a rematch resets the match.
    pub next_first_player: Seat,
}

impl Room {
    pub fn new(code: &str, players_needed: usize, target_score: u32) -> Self {
        Self {
            code: code.to_string(),
            players_needed,
            target_score,
            seats: Vec::new(),
            game: None,
            timer: TurnTimer::default(),
            next_first_player: if rand::rng().random_bool(0.5) { 0 } else { 1 },
        }
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= self.players_needed
    }

    /// Resolves a connection back to its current seat number. Seats shift
    /// down when an earlier seat disconnects, so connections look themselves
    /// up by identity instead of caching an index.
    pub fn seat_of(&self, outbox: &Arc<dyn SeatOutbox>) -> Option<Seat> {
        self.seats.iter().position(|s| Arc::ptr_eq(s, outbox))
    }

    pub fn send_to(&self, seat: Seat, text: String) {
        if let Some(outbox) = self.seats.get(seat) {
            outbox.send_text(text);
        }
    }

    pub fn broadcast(&self, text: &str) {
        for outbox in &self.seats {
            outbox.send_text(text.to_string());
        }
    }

    pub fn broadcast_except(&self, skip: Seat, text: &str) {
        for (seat, outbox) in self.seats.iter().enumerate() {
            if seat != skip {
                outbox.send_text(text.to_string());
            }
        }
    }
}
