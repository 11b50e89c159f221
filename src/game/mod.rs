// Public API
pub use cards::{shuffled_deck, sort_hand_for_deal, Card, Rank, Suit};
pub use engine::{
    apply_action, begin_next_round, complete_rematch, handle_turn_timeout, Action, EngineEvent,
    RoundReveal, NEXT_ROUND_DELAY_MS, REMATCH_COUNTDOWN_MS,
};
pub use melds::{detect_meld_groups, layout_from_order, HandLayout};
pub use state::{
    now_ms, opponent, MatchState, Phase, ReplenishInfo, Round, Seat, WinType, SEAT_COUNT,
};

// Internal modules
mod cards;
mod engine;
mod melds;
mod state;
