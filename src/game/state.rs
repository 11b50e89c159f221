use chrono::Utc;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::cards::{shuffled_deck, sort_hand_for_deal, Card};

/// Seat number within a room; doubles as the protocol `playerId`.
pub type Seat = usize;

/// Two-player rooms only; the engine is written against this pair size.
pub const SEAT_COUNT: usize = 2;

pub fn opponent(seat: Seat) -> Seat {
    (seat + 1) % SEAT_COUNT
}

/// Per-turn sub-state: the active player must draw, then discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Draw,
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinType {
    Gin,
}

/// Details of a discard-pile reshuffle, forwarded to clients so they can
/// animate the deck refill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReplenishInfo {
    pub before: usize,
    pub after: usize,
    pub ts: i64,
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// One dealt hand played to completion. Everything here is reset by the next
/// deal; match-scoped data lives on [`MatchState`].
#[derive(Debug, Clone)]
pub struct Round {
    pub deck: Vec<Card>,
    pub discard_pile: Vec<Card>,
    pub hands: [Vec<Card>; SEAT_COUNT],
    pub current_player: Seat,
    pub phase: Phase,
    pub round_over: bool,
    pub winner: Option<Seat>,
    pub win_type: Option<WinType>,
    pub round_id: u64,
    /// Client-reported visual orderings, keyed by seat. Advisory input used
    /// only for meld grouping; never an index into server arrays.
    pub declared_orders: [Vec<String>; SEAT_COUNT],
}

impl Round {
    /// Deals a fresh round from the given deck: 10 cards alternately to each
    /// seat, one card flipped to start the discard pile. Hands get the
    /// deterministic deal sort, which also seeds the declared orders so
    /// client and server start from the same layout.
    pub fn deal(mut deck: Vec<Card>, first_player: Seat, round_id: u64) -> Self {
        let mut hands: [Vec<Card>; SEAT_COUNT] = [Vec::with_capacity(11), Vec::with_capacity(11)];
        for _ in 0..10 {
            for hand in hands.iter_mut() {
                if let Some(card) = deck.pop() {
                    hand.push(card);
                }
            }
        }

        let mut discard_pile = Vec::new();
        if let Some(card) = deck.pop() {
            discard_pile.push(card);
        }

        for hand in hands.iter_mut() {
            sort_hand_for_deal(hand);
        }
        let declared_orders = [
            hands[0].iter().map(Card::id).collect(),
            hands[1].iter().map(Card::id).collect(),
        ];

        Self {
            deck,
            discard_pile,
            hands,
            current_player: first_player,
            phase: Phase::Draw,
            round_over: false,
            winner: None,
            win_type: None,
            round_id,
            declared_orders,
        }
    }

    pub fn discard_top(&self) -> Option<Card> {
        self.discard_pile.last().copied()
    }

    /// Shuffles the discard pile back into the empty deck, keeping the
    /// current top card as the sole remaining discard. A single discard
    /// cannot be split into deck + visible top, so nothing happens below
    /// two cards and the caller's draw fails on the still-empty deck.
    pub fn replenish_if_empty(&mut self) -> Option<ReplenishInfo> {
        if !self.deck.is_empty() {
            return None;
        }
        if self.discard_pile.len() < 2 {
            return None;
        }

        let before = self.deck.len();
        let top = self.discard_pile.pop()?;
        let mut rest = std::mem::take(&mut self.discard_pile);
        rest.shuffle(&mut rand::rng());

        self.deck = rest;
        self.discard_pile.push(top);

        Some(ReplenishInfo {
            before,
            after: self.deck.len(),
            ts: now_ms(),
        })
    }

    /// Removes the card with the given identity from a seat's hand.
    pub fn take_from_hand(&mut self, seat: Seat, card_id: &str) -> Option<Card> {
        let hand = &mut self.hands[seat];
        let idx = hand.iter().position(|c| c.id() == card_id)?;
        Some(hand.remove(idx))
    }

    /// Card total across deck, discard pile, and both hands. 52 in every
    /// reachable state (card conservation).
    pub fn total_cards(&self) -> usize {
        self.deck.len()
            + self.discard_pile.len()
            + self.hands.iter().map(Vec::len).sum::<usize>()
    }
}

/// Match-scoped state wrapping the in-progress round. Survives across
/// rounds; a rematch resets it in place rather than replacing it.
#[derive(Debug, Clone)]
pub struct MatchState {
    pub scores: [u32; SEAT_COUNT],
    pub target_score: u32,
    pub match_over: bool,
    pub match_winner: Option<Seat>,
    pub rematch_votes: [bool; SEAT_COUNT],
    pub rematch_countdown_ends_at: Option<i64>,
    pub turn_ms: u64,
    pub round: Round,
}

impl MatchState {
    pub fn new(target_score: u32, turn_ms: u64, first_player: Seat) -> Self {
        Self::with_deck(shuffled_deck(), target_score, turn_ms, first_player)
    }

    /// Builds a match whose first round is dealt from the given deck order.
    /// Production callers shuffle; tests script the deck.
    pub fn with_deck(deck: Vec<Card>, target_score: u32, turn_ms: u64, first_player: Seat) -> Self {
        Self {
            scores: [0; SEAT_COUNT],
            target_score,
            match_over: false,
            match_winner: None,
            rematch_votes: [false; SEAT_COUNT],
            rematch_countdown_ends_at: None,
            turn_ms,
            round: Round::deal(deck, first_player, 1),
        }
    }

    pub fn start_next_round(&mut self, first_player: Seat) {
        self.start_next_round_with_deck(shuffled_deck(), first_player);
    }

    pub fn start_next_round_with_deck(&mut self, deck: Vec<Card>, first_player: Seat) {
        let next_round_id = self.round.round_id + 1;
        self.round = Round::deal(deck, first_player, next_round_id);
    }

    /// Clears match-scoped results ahead of the rematch deal. Round ids keep
    /// increasing across rematches so stale timer callbacks stay stale.
    pub fn reset_for_rematch(&mut self) {
        self.scores = [0; SEAT_COUNT];
        self.match_over = false;
        self.match_winner = None;
        self.rematch_votes = [false; SEAT_COUNT];
        self.rematch_countdown_ends_at = None;
    }
}
