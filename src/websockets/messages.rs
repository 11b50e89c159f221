use serde::{Deserialize, Serialize};

use crate::game::{
    layout_from_order, Card, HandLayout, MatchState, Phase, ReplenishInfo, RoundReveal, Seat,
    WinType, SEAT_COUNT,
};

/// Messages a client may send. All share a `type` discriminator; the hyphen
/// spellings are canonical and the snake_case aliases keep older clients
/// working.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "create_room")]
    CreateRoom {
        code: Option<String>,
        #[serde(rename = "playersNeeded")]
        players_needed: Option<usize>,
        #[serde(rename = "pointsTarget")]
        points_target: Option<u32>,
    },

    #[serde(rename = "join_room")]
    JoinRoom { code: Option<String> },

    #[serde(rename = "start_game")]
    StartGame { code: Option<String> },

    #[serde(rename = "draw-deck", alias = "draw_deck")]
    DrawDeck,

    #[serde(rename = "draw-discard", alias = "draw_discard")]
    DrawDiscard,

    /// Discard by id, or by card object for clients that send the full card.
    #[serde(rename = "discard")]
    Discard {
        #[serde(rename = "cardId")]
        card_id: Option<String>,
        card: Option<Card>,
    },

    #[serde(rename = "gin", alias = "declare_gin")]
    Gin,

    #[serde(rename = "rematch", alias = "vote_rematch")]
    Rematch,

    #[serde(rename = "hand_order")]
    HandOrder { order: Option<Vec<String>> },
}

/// Messages the server pushes. `state` snapshots are per-seat and frequent;
/// the rest are one-off events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init {
        #[serde(rename = "playerId")]
        player_id: Seat,
    },

    #[serde(rename = "room_update")]
    RoomUpdate {
        code: String,
        joined: usize,
        needed: usize,
    },

    #[serde(rename = "join_ok")]
    JoinOk { code: String },

    #[serde(rename = "join_error")]
    JoinError { message: String },

    #[serde(rename = "game_start")]
    GameStart { code: String },

    #[serde(rename = "state")]
    State(StateSnapshot),

    #[serde(rename = "round_reveal")]
    RoundReveal(RevealPayload),

    /// Sent with the card id to the seat that timed out (so its client can
    /// animate the removal) and without it to everyone else.
    #[serde(rename = "timeout_discard")]
    TimeoutDiscard {
        #[serde(rename = "playerId")]
        player_id: Seat,
        #[serde(rename = "cardId", skip_serializing_if = "Option::is_none")]
        card_id: Option<String>,
    },

    #[serde(rename = "timeout_pass")]
    TimeoutPass {
        #[serde(rename = "playerId")]
        player_id: Seat,
    },

    #[serde(rename = "deck_reshuffle")]
    DeckReshuffle {
        code: String,
        #[serde(rename = "deckCount")]
        deck_count: usize,
        info: ReplenishInfo,
    },
}

impl ServerMessage {
    pub fn join_error(message: impl Into<String>) -> Self {
        ServerMessage::JoinError {
            message: message.into(),
        }
    }
}

/// Authoritative per-seat view of the room. Each seat sees only its own
/// hand; the opponent is reduced to a card count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub code: String,

    pub your_hand: Vec<Card>,
    pub your_turn: bool,
    pub phase: Phase,

    pub discard_top: Option<Card>,
    pub deck_count: usize,
    pub opp_hand_count: usize,

    pub turn_ends_at: Option<i64>,
    pub turn_ms: u64,

    pub deadwood_count: usize,
    pub deadwood_points: u32,

    pub deck_replenished: bool,
    pub deck_replenish_info: Option<ReplenishInfo>,

    pub round_over: bool,
    pub winner: Option<Seat>,
    pub win_type: Option<WinType>,
    pub round_id: u64,
    pub gin_player_id: Option<Seat>,
    pub final_discard: Option<Card>,

    pub scores: [u32; SEAT_COUNT],
    pub target_score: u32,
    pub match_over: bool,
    pub match_winner: Option<Seat>,

    pub rematch_votes: [bool; SEAT_COUNT],
    pub rematch_countdown_ends_at: Option<i64>,
}

impl StateSnapshot {
    /// Serializes the match as seen from one seat. Deadwood is computed from
    /// that seat's last declared ordering, mirroring the client's grouping.
    pub fn for_seat(
        code: &str,
        game: &MatchState,
        seat: Seat,
        turn_ends_at: Option<i64>,
        replenish: Option<ReplenishInfo>,
    ) -> Self {
        let round = &game.round;
        let hand = &round.hands[seat];
        let opp = crate::game::opponent(seat);
        let layout = layout_from_order(hand, &round.declared_orders[seat]);

        Self {
            code: code.to_string(),
            your_hand: hand.clone(),
            your_turn: round.current_player == seat,
            phase: round.phase,
            discard_top: round.discard_top(),
            deck_count: round.deck.len(),
            opp_hand_count: round.hands[opp].len(),
            turn_ends_at,
            turn_ms: game.turn_ms,
            deadwood_count: layout.deadwood_count,
            deadwood_points: layout.deadwood_points,
            deck_replenished: replenish.is_some(),
            deck_replenish_info: replenish,
            round_over: round.round_over,
            winner: round.winner,
            win_type: round.win_type,
            round_id: round.round_id,
            gin_player_id: if round.round_over { round.winner } else { None },
            final_discard: round.discard_top(),
            scores: game.scores,
            target_score: game.target_score,
            match_over: game.match_over,
            match_winner: game.match_winner,
            rematch_votes: game.rematch_votes,
            rematch_countdown_ends_at: game.rematch_countdown_ends_at,
        }
    }
}

/// End-of-round reveal: both hands with their declared orders and computed
/// layouts, so clients can run the overlay without trusting local state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealPayload {
    pub code: String,
    pub round_id: u64,

    pub gin_player_id: Seat,
    pub final_discard: Option<Card>,

    pub winner: Seat,
    pub loser: Seat,
    pub win_type: WinType,

    pub hands: [Vec<Card>; SEAT_COUNT],
    pub hand_orders: [Vec<String>; SEAT_COUNT],
    pub layouts: [HandLayout; SEAT_COUNT],
    pub scores: [u32; SEAT_COUNT],
    pub target_score: u32,

    pub match_over: bool,
    pub match_winner: Option<Seat>,
}

impl RevealPayload {
    pub fn new(code: &str, reveal: RoundReveal) -> Self {
        Self {
            code: code.to_string(),
            round_id: reveal.round_id,
            gin_player_id: reveal.winner,
            final_discard: reveal.final_discard,
            winner: reveal.winner,
            loser: reveal.loser,
            win_type: reveal.win_type,
            hands: reveal.hands,
            hand_orders: reveal.hand_orders,
            layouts: reveal.layouts,
            scores: reveal.scores,
            target_score: reveal.target_score,
            match_over: reveal.match_over,
            match_winner: reveal.match_winner,
        }
    }
}
