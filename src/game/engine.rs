use rand::Rng;

use super::cards::Card;
use super::melds::{layout_from_order, HandLayout};
use super::state::{now_ms, opponent, MatchState, Phase, ReplenishInfo, Seat, WinType};

/// Reveal-overlay window before the next round is dealt automatically.
pub const NEXT_ROUND_DELAY_MS: u64 = 9_000;
/// Countdown once both seats have voted for a rematch.
pub const REMATCH_COUNTDOWN_MS: u64 = 5_000;

/// A validated client intent against the match state machine. The transport
/// layer normalizes wire aliases and payload shapes before constructing one.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    DrawDeck,
    DrawDiscard,
    Discard { card_id: String },
    Gin,
    Rematch,
    HandOrder { order: Vec<String> },
}

/// Facts produced by applying an action. The room service interprets these
/// in order: timers are (re)armed, one-off messages emitted, snapshots
/// broadcast, and follow-up work scheduled.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Room state changed; broadcast fresh per-seat snapshots.
    StateChanged,
    /// A new Draw phase began for the current player; arm the turn timer.
    TurnStarted,
    /// The empty deck was refilled from the discard pile mid-draw.
    DeckReshuffled(ReplenishInfo),
    /// The timer forced a discard; the owning seat learns which card.
    TimeoutDiscarded { seat: Seat, card: Card },
    /// The timer expired before the player drew; turn passes with no discard.
    TimeoutPassed { seat: Seat },
    /// A gin ended the round; carry the full reveal payload.
    RoundEnded(Box<RoundReveal>),
    /// A score reached the target; cancel the turn timer.
    MatchEnded,
    /// Schedule the next deal after the reveal window.
    NextRoundPending { delay_ms: u64 },
    /// Both seats voted; schedule the match reset.
    RematchCountdownStarted { delay_ms: u64 },
}

/// Everything clients need to run the end-of-round reveal: both hands, the
/// declared orders they were grouped by, and the computed layouts.
#[derive(Debug, Clone)]
pub struct RoundReveal {
    pub round_id: u64,
    pub winner: Seat,
    pub loser: Seat,
    pub win_type: WinType,
    pub final_discard: Option<Card>,
    pub hands: [Vec<Card>; 2],
    pub hand_orders: [Vec<String>; 2],
    pub layouts: [HandLayout; 2],
    pub scores: [u32; 2],
    pub target_score: u32,
    pub match_over: bool,
    pub match_winner: Option<Seat>,
}

/// Applies a client action to the match. Every precondition failure is a
/// silent no-op (empty event list) — stale or malicious messages are simply
/// ignored, never answered with an error.
pub fn apply_action(game: &mut MatchState, seat: Seat, action: Action) -> Vec<EngineEvent> {
    // Hand order is client-driven UI bookkeeping, accepted in any state and
    // stored for later meld grouping. No broadcast.
    if let Action::HandOrder { order } = action {
        game.round.declared_orders[seat] = order;
        return Vec::new();
    }

    // Hard locks: only rematch votes get through once the round or match is
    // settled, and only the current player may act during live play.
    let is_rematch = matches!(action, Action::Rematch);
    if game.match_over && !is_rematch {
        return Vec::new();
    }
    if game.round.round_over && !is_rematch {
        return Vec::new();
    }
    if seat != game.round.current_player && !is_rematch {
        return Vec::new();
    }

    match action {
        Action::DrawDeck => draw_from_deck(game, seat),
        Action::DrawDiscard => draw_from_discard(game, seat),
        Action::Discard { card_id } => discard(game, seat, &card_id),
        Action::Gin => declare_gin(game, seat),
        Action::Rematch => vote_rematch(game, seat),
        Action::HandOrder { .. } => Vec::new(),
    }
}

fn draw_from_deck(game: &mut MatchState, seat: Seat) -> Vec<EngineEvent> {
    if game.round.phase != Phase::Draw {
        return Vec::new();
    }

    let mut events = Vec::new();
    if let Some(info) = game.round.replenish_if_empty() {
        events.push(EngineEvent::DeckReshuffled(info));
    }

    // Still empty after attempting replenishment: nothing to draw.
    let card = match game.round.deck.pop() {
        Some(card) => card,
        None => return events,
    };

    game.round.hands[seat].push(card);
    game.round.phase = Phase::Discard;
    events.push(EngineEvent::StateChanged);
    events
}

fn draw_from_discard(game: &mut MatchState, seat: Seat) -> Vec<EngineEvent> {
    if game.round.phase != Phase::Draw {
        return Vec::new();
    }
    let card = match game.round.discard_pile.pop() {
        Some(card) => card,
        None => return Vec::new(),
    };

    game.round.hands[seat].push(card);
    game.round.phase = Phase::Discard;
    vec![EngineEvent::StateChanged]
}

fn discard(game: &mut MatchState, seat: Seat, card_id: &str) -> Vec<EngineEvent> {
    if game.round.phase != Phase::Discard {
        return Vec::new();
    }
    let card = match game.round.take_from_hand(seat, card_id) {
        Some(card) => card,
        None => return Vec::new(),
    };

    game.round.discard_pile.push(card);
    advance_turn(game)
}

/// Flips the turn to the other seat and re-enters the Draw phase.
fn advance_turn(game: &mut MatchState) -> Vec<EngineEvent> {
    game.round.current_player = opponent(game.round.current_player);
    game.round.phase = Phase::Draw;
    vec![EngineEvent::TurnStarted, EngineEvent::StateChanged]
}

fn declare_gin(game: &mut MatchState, seat: Seat) -> Vec<EngineEvent> {
    if game.round.phase != Phase::Discard {
        return Vec::new();
    }

    let winner = seat;
    let loser = opponent(seat);

    // Never received an ordering for the declarer: fall back to the hand as
    // currently held rather than rejecting outright.
    if game.round.declared_orders[winner].is_empty() {
        game.round.declared_orders[winner] =
            game.round.hands[winner].iter().map(Card::id).collect();
    }

    let winner_layout = layout_from_order(
        &game.round.hands[winner],
        &game.round.declared_orders[winner],
    );
    if winner_layout.deadwood_count > 1 {
        return Vec::new();
    }

    let loser_layout =
        layout_from_order(&game.round.hands[loser], &game.round.declared_orders[loser]);

    // Scoring variant: the loser accrues their own deadwood points, and the
    // first score to reach the target loses the match.
    game.scores[loser] += loser_layout.deadwood_points;

    let layouts = [
        layout_from_order(&game.round.hands[0], &game.round.declared_orders[0]),
        layout_from_order(&game.round.hands[1], &game.round.declared_orders[1]),
    ];

    game.round.round_over = true;
    game.round.winner = Some(winner);
    game.round.win_type = Some(WinType::Gin);

    let mut events = Vec::new();
    if let Some(hit) = game.scores.iter().position(|s| *s >= game.target_score) {
        game.match_over = true;
        game.match_winner = Some(opponent(hit));
        events.push(EngineEvent::MatchEnded);
    }

    events.push(EngineEvent::RoundEnded(Box::new(RoundReveal {
        round_id: game.round.round_id,
        winner,
        loser,
        win_type: WinType::Gin,
        final_discard: game.round.discard_top(),
        hands: game.round.hands.clone(),
        hand_orders: game.round.declared_orders.clone(),
        layouts,
        scores: game.scores,
        target_score: game.target_score,
        match_over: game.match_over,
        match_winner: game.match_winner,
    })));
    events.push(EngineEvent::StateChanged);

    if !game.match_over {
        events.push(EngineEvent::NextRoundPending {
            delay_ms: NEXT_ROUND_DELAY_MS,
        });
    }
    events
}

fn vote_rematch(game: &mut MatchState, seat: Seat) -> Vec<EngineEvent> {
    game.rematch_votes[seat] = true;
    let mut events = vec![EngineEvent::StateChanged];

    let both_ready = game.rematch_votes.iter().all(|v| *v);
    if both_ready && game.rematch_countdown_ends_at.is_none() {
        game.rematch_countdown_ends_at = Some(now_ms() + REMATCH_COUNTDOWN_MS as i64);
        events.push(EngineEvent::StateChanged);
        events.push(EngineEvent::RematchCountdownStarted {
            delay_ms: REMATCH_COUNTDOWN_MS,
        });
    }
    events
}

/// Turn-timer expiry. Enters the same mutation path as a manual discard: if
/// the player already drew (11 cards in hand) a uniformly random card is
/// discarded on their behalf; otherwise the turn simply passes. Either way
/// the opponent gets the turn, so a vacant seat cannot hang the match.
pub fn handle_turn_timeout(game: &mut MatchState) -> Vec<EngineEvent> {
    if game.round.round_over || game.match_over {
        return Vec::new();
    }

    let seat = game.round.current_player;
    let hand_len = game.round.hands[seat].len();

    let mut events = Vec::new();
    if hand_len > 10 {
        let idx = rand::rng().random_range(0..hand_len);
        let card = game.round.hands[seat].remove(idx);
        game.round.discard_pile.push(card);
        events.push(EngineEvent::TimeoutDiscarded { seat, card });
    } else {
        events.push(EngineEvent::TimeoutPassed { seat });
    }

    events.extend(advance_turn(game));
    events
}

/// Deals the next round after the reveal window. The caller has already
/// verified the scheduling callback is not stale (round id check); this
/// re-validates the state flags.
pub fn begin_next_round(game: &mut MatchState, first_player: Seat) -> Vec<EngineEvent> {
    if !game.round.round_over || game.match_over {
        return Vec::new();
    }
    game.start_next_round(first_player);
    vec![EngineEvent::TurnStarted, EngineEvent::StateChanged]
}

/// Rematch countdown expiry: only a finished match resets. Scores, votes,
/// and flags clear; round ids keep counting up.
pub fn complete_rematch(game: &mut MatchState, first_player: Seat) -> Vec<EngineEvent> {
    if !game.match_over {
        return Vec::new();
    }
    game.reset_for_rematch();
    game.start_next_round(first_player);
    vec![EngineEvent::TurnStarted, EngineEvent::StateChanged]
}
