use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info};

use super::models::{Room, SeatOutbox};
use super::registry::RoomRegistry;
use crate::game::{
    self, Action, EngineEvent, MatchState, Phase, Seat, SEAT_COUNT,
};
use crate::websockets::messages::{RevealPayload, ServerMessage, StateSnapshot};

/// Room codes shorter than this are rejected outright.
const MIN_CODE_LEN: usize = 4;

/// Drives every room: seating, match lifecycle, action dispatch, timers,
/// and broadcasting. All room mutation funnels through here, one locked
/// handler at a time; the engine stays a pure state machine underneath.
#[derive(Clone)]
pub struct RoomService {
    registry: Arc<dyn RoomRegistry>,
    turn_ms: u64,
}

fn send_message(outbox: &Arc<dyn SeatOutbox>, message: &ServerMessage) {
    if let Ok(json) = serde_json::to_string(message) {
        outbox.send_text(json);
    }
}

fn broadcast_message(room: &Room, message: &ServerMessage) {
    if let Ok(json) = serde_json::to_string(message) {
        room.broadcast(&json);
    }
}

impl RoomService {
    pub fn new(registry: Arc<dyn RoomRegistry>, turn_ms: u64) -> Self {
        Self { registry, turn_ms }
    }

    /// Creates a room and seats the creator at seat 0. The code arrives
    /// already normalized (upper-cased, trimmed) from the connection layer.
    /// Returns the room code on success; failures are answered on the
    /// creator's socket as `join_error` and leave no room behind.
    pub async fn create_room(
        &self,
        outbox: Arc<dyn SeatOutbox>,
        code: &str,
        players_needed: usize,
        target_score: u32,
    ) -> Option<String> {
        if code.chars().count() < MIN_CODE_LEN {
            send_message(&outbox, &ServerMessage::join_error("Invalid room code."));
            return None;
        }
        if players_needed != SEAT_COUNT {
            send_message(
                &outbox,
                &ServerMessage::join_error("Only 2-player rooms are supported."),
            );
            return None;
        }

        let mut room = Room::new(code, players_needed, target_score);
        room.seats.push(outbox.clone());
        let shared = Arc::new(tokio::sync::Mutex::new(room));

        if self.registry.insert_room(code, shared).await.is_err() {
            send_message(
                &outbox,
                &ServerMessage::join_error("Code already exists. Try again."),
            );
            return None;
        }

        send_message(&outbox, &ServerMessage::Init { player_id: 0 });
        send_message(
            &outbox,
            &ServerMessage::RoomUpdate {
                code: code.to_string(),
                joined: 1,
                needed: players_needed,
            },
        );

        info!(room_code = %code, target_score, "room created");
        Some(code.to_string())
    }

    /// Seats a connection in an existing room. Returns the joined seat's
    /// room code on success.
    pub async fn join_room(&self, outbox: Arc<dyn SeatOutbox>, code: &str) -> Option<String> {
        let room_ref = match self.registry.get_room(code).await {
            Some(room) => room,
            None => {
                send_message(&outbox, &ServerMessage::join_error("Room not found."));
                return None;
            }
        };

        let mut room = room_ref.lock().await;
        if room.is_full() {
            send_message(&outbox, &ServerMessage::join_error("Room is full."));
            return None;
        }

        room.seats.push(outbox.clone());
        let seat = room.seats.len() - 1;

        send_message(&outbox, &ServerMessage::Init { player_id: seat });
        send_message(
            &outbox,
            &ServerMessage::JoinOk {
                code: code.to_string(),
            },
        );
        self.send_room_update(&room);

        info!(room_code = %code, seat, "player joined");
        Some(code.to_string())
    }

    /// Host (seat 0) starts the match once the room is full. Also deals the
    /// next round if a match is already in progress.
    pub async fn start_game(&self, code: &str, outbox: &Arc<dyn SeatOutbox>) {
        let room_ref = match self.registry.get_room(code).await {
            Some(room) => room,
            None => return,
        };
        let mut room = room_ref.lock().await;

        let seat = match room.seat_of(outbox) {
            Some(seat) => seat,
            None => return,
        };
        if seat != 0 {
            return;
        }
        if room.seats.len() < room.players_needed {
            send_message(
                outbox,
                &ServerMessage::join_error("Need more players to start."),
            );
            return;
        }

        broadcast_message(
            &room,
            &ServerMessage::GameStart {
                code: code.to_string(),
            },
        );
        self.deal_round(&mut room);
        info!(room_code = %code, "game started");
    }

    /// Routes a validated game action from a connection into the engine.
    /// The seat is resolved under the room lock so reindexed seats cannot
    /// act with a stale number.
    pub async fn handle_action(&self, code: &str, outbox: &Arc<dyn SeatOutbox>, action: Action) {
        let room_ref = match self.registry.get_room(code).await {
            Some(room) => room,
            None => return,
        };
        let mut room = room_ref.lock().await;

        let seat = match room.seat_of(outbox) {
            Some(seat) => seat,
            None => return,
        };
        debug!(room_code = %code, seat, action = ?action, "dispatching action");

        let events = match room.game.as_mut() {
            Some(state) => game::apply_action(state, seat, action),
            None => return,
        };
        self.apply_events(&mut room, events);
    }

    /// Removes a disconnected seat: remaining players are renumbered and
    /// re-`init`ed, an empty room is deleted, and an interrupted match is
    /// torn down with its timer.
    pub async fn handle_disconnect(&self, code: &str, outbox: &Arc<dyn SeatOutbox>) {
        let room_ref = match self.registry.get_room(code).await {
            Some(room) => room,
            None => return,
        };

        let room_is_empty = {
            let mut room = room_ref.lock().await;
            let seat = match room.seat_of(outbox) {
                Some(seat) => seat,
                None => return,
            };
            room.seats.remove(seat);
            info!(room_code = %code, seat, "player disconnected");

            // Seat numbers are list indices; everyone re-learns theirs.
            for (new_seat, remaining) in room.seats.iter().enumerate() {
                send_message(remaining, &ServerMessage::Init { player_id: new_seat });
            }

            if room.seats.is_empty() {
                room.timer.cancel();
                true
            } else {
                self.send_room_update(&room);

                // A live match cannot continue one-handed.
                room.timer.cancel();
                room.game = None;
                if let Some(first) = room.seats.first() {
                    send_message(
                        first,
                        &ServerMessage::join_error("Player disconnected. Game ended."),
                    );
                }
                false
            }
        };

        if room_is_empty {
            self.registry.remove_room(code).await;
            info!(room_code = %code, "room deleted");
        }
    }

    /* ----------------------- timer-driven callbacks ----------------------- */

    /// Turn deadline expiry. The round id captured at arm time gates the
    /// callback: if the round moved on (or the game ended) this fire is
    /// stale and does nothing.
    async fn on_turn_timeout(&self, code: &str, round_id: u64) {
        let room_ref = match self.registry.get_room(code).await {
            Some(room) => room,
            None => return,
        };
        let mut room = room_ref.lock().await;

        let events = match room.game.as_mut() {
            Some(state) if state.round.round_id == round_id => game::handle_turn_timeout(state),
            _ => return,
        };
        if events.is_empty() {
            return;
        }

        info!(room_code = %code, round_id, "turn timer expired");
        self.apply_events(&mut room, events);
    }

    /// Deals the follow-up round once the reveal window has elapsed.
    async fn on_next_round_due(&self, code: &str, round_id: u64) {
        let room_ref = match self.registry.get_room(code).await {
            Some(room) => room,
            None => return,
        };
        let mut room = room_ref.lock().await;

        let first = room.next_first_player;
        let events = match room.game.as_mut() {
            Some(state) if state.round.round_id == round_id => {
                game::begin_next_round(state, first)
            }
            _ => return,
        };
        if events.is_empty() {
            return;
        }

        room.next_first_player = game::opponent(first);
        info!(room_code = %code, "next round dealt");
        self.apply_events(&mut room, events);
    }

    /// Rematch countdown expiry: resets a finished match and deals afresh,
    /// with a newly randomized first player.
    async fn on_rematch_due(&self, code: &str) {
        let room_ref = match self.registry.get_room(code).await {
            Some(room) => room,
            None => return,
        };
        let mut room = room_ref.lock().await;

        let first: Seat = if rand::rng().random_bool(0.5) { 0 } else { 1 };
        let events = match room.game.as_mut() {
            Some(state) => game::complete_rematch(state, first),
            None => return,
        };
        if events.is_empty() {
            return;
        }

        room.next_first_player = game::opponent(first);
        info!(room_code = %code, "rematch started");
        self.apply_events(&mut room, events);
    }

    /* --------------------------- event plumbing --------------------------- */

    /// Interprets engine events in order: timers first (snapshots read the
    /// new deadline), then one-off messages and snapshot broadcasts, then
    /// scheduled follow-ups.
    fn apply_events(&self, room: &mut Room, events: Vec<EngineEvent>) {
        for event in events {
            match event {
                EngineEvent::TurnStarted => self.arm_turn_timer(room),
                EngineEvent::StateChanged => self.broadcast_state(room),
                EngineEvent::DeckReshuffled(info) => {
                    broadcast_message(
                        room,
                        &ServerMessage::DeckReshuffle {
                            code: room.code.clone(),
                            deck_count: info.after,
                            info,
                        },
                    );
                }
                EngineEvent::TimeoutDiscarded { seat, card } => {
                    // The owner learns which card left their hand; the rest
                    // of the room only learns a timeout happened.
                    if let Ok(json) = serde_json::to_string(&ServerMessage::TimeoutDiscard {
                        player_id: seat,
                        card_id: Some(card.id()),
                    }) {
                        room.send_to(seat, json);
                    }
                    if let Ok(json) = serde_json::to_string(&ServerMessage::TimeoutDiscard {
                        player_id: seat,
                        card_id: None,
                    }) {
                        room.broadcast_except(seat, &json);
                    }
                }
                EngineEvent::TimeoutPassed { seat } => {
                    broadcast_message(room, &ServerMessage::TimeoutPass { player_id: seat });
                }
                EngineEvent::RoundEnded(reveal) => {
                    let payload = RevealPayload::new(&room.code, *reveal);
                    broadcast_message(room, &ServerMessage::RoundReveal(payload));
                }
                EngineEvent::MatchEnded => room.timer.cancel(),
                EngineEvent::NextRoundPending { delay_ms } => {
                    self.schedule_next_round(room, delay_ms)
                }
                EngineEvent::RematchCountdownStarted { delay_ms } => {
                    self.schedule_rematch_reset(room, delay_ms)
                }
            }
        }
    }

    /// Replaces the room's match (or deals the next round of the current
    /// one), arms the timer, and pushes the opening snapshots.
    fn deal_round(&self, room: &mut Room) {
        let first = room.next_first_player;
        room.next_first_player = game::opponent(first);

        match room.game.as_mut() {
            Some(state) => state.start_next_round(first),
            None => room.game = Some(MatchState::new(room.target_score, self.turn_ms, first)),
        }

        self.arm_turn_timer(room);
        self.broadcast_state(room);
    }

    /// Arms the per-room turn timer for the current round, cancelling any
    /// previous one. The spawned task carries the round id for the
    /// staleness check on expiry.
    fn arm_turn_timer(&self, room: &mut Room) {
        let (turn_ms, round_id) = match room.game.as_ref() {
            Some(state) => (state.turn_ms, state.round.round_id),
            None => return,
        };

        let ends_at = game::now_ms() + turn_ms as i64;
        let service = self.clone();
        let code = room.code.clone();
        let handle = tokio::spawn(async move {
            sleep(Duration::from_millis(turn_ms)).await;
            service.on_turn_timeout(&code, round_id).await;
        });

        room.timer.arm(handle, ends_at);
    }

    fn schedule_next_round(&self, room: &Room, delay_ms: u64) {
        let round_id = match room.game.as_ref() {
            Some(state) => state.round.round_id,
            None => return,
        };
        let service = self.clone();
        let code = room.code.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            service.on_next_round_due(&code, round_id).await;
        });
    }

    fn schedule_rematch_reset(&self, room: &Room, delay_ms: u64) {
        let service = self.clone();
        let code = room.code.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            service.on_rematch_due(&code).await;
        });
    }

    fn send_room_update(&self, room: &Room) {
        broadcast_message(
            room,
            &ServerMessage::RoomUpdate {
                code: room.code.clone(),
                joined: room.seats.len(),
                needed: room.players_needed,
            },
        );
    }

    /// Pushes a fresh per-seat snapshot to every connection. If a draw is
    /// pending against an empty deck the discard pile is folded back in
    /// first, so the snapshot already reflects the refilled deck.
    fn broadcast_state(&self, room: &mut Room) {
        let replenish = match room.game.as_mut() {
            Some(state)
                if state.round.phase == Phase::Draw && state.round.deck.is_empty() =>
            {
                state.round.replenish_if_empty()
            }
            Some(_) => None,
            None => return,
        };

        let state = match room.game.as_ref() {
            Some(state) => state,
            None => return,
        };
        let ends_at = room.timer.ends_at;

        for (seat, outbox) in room.seats.iter().enumerate() {
            let snapshot = StateSnapshot::for_seat(&room.code, state, seat, ends_at, replenish);
            if let Ok(json) = serde_json::to_string(&ServerMessage::State(snapshot)) {
                outbox.send_text(json);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::models::test_utils::RecordingOutbox;
    use crate::room::registry::InMemoryRoomRegistry;

    struct Fixture {
        service: RoomService,
        registry: Arc<InMemoryRoomRegistry>,
    }

    impl Fixture {
        fn new(turn_ms: u64) -> Self {
            let registry = Arc::new(InMemoryRoomRegistry::new());
            let service = RoomService::new(registry.clone(), turn_ms);
            Self { service, registry }
        }

        /// Creates a full two-seat room named CODE and returns the outboxes.
        async fn seated_room(&self) -> (Arc<RecordingOutbox>, Arc<RecordingOutbox>) {
            let host = RecordingOutbox::new();
            let guest = RecordingOutbox::new();
            self.service
                .create_room(host.clone(), "CODE", 2, 10)
                .await
                .expect("room created");
            self.service
                .join_room(guest.clone(), "CODE")
                .await
                .expect("room joined");
            (host, guest)
        }

        async fn started_room(&self) -> (Arc<RecordingOutbox>, Arc<RecordingOutbox>) {
            let (host, guest) = self.seated_room().await;
            let host_outbox: Arc<dyn SeatOutbox> = host.clone();
            self.service.start_game("CODE", &host_outbox).await;
            host.clear();
            guest.clear();
            (host, guest)
        }

        async fn current_player(&self) -> Seat {
            let room_ref = self.registry.get_room("CODE").await.unwrap();
            let room = room_ref.lock().await;
            room.game.as_ref().unwrap().round.current_player
        }

        async fn act(&self, outbox: &Arc<RecordingOutbox>, action: Action) {
            let as_dyn: Arc<dyn SeatOutbox> = outbox.clone();
            self.service.handle_action("CODE", &as_dyn, action).await;
        }

        async fn seat_outbox(
            &self,
            seat: Seat,
            host: &Arc<RecordingOutbox>,
            guest: &Arc<RecordingOutbox>,
        ) -> Arc<RecordingOutbox> {
            if seat == 0 {
                host.clone()
            } else {
                guest.clone()
            }
        }
    }

    #[tokio::test]
    async fn test_create_room_seats_creator() {
        let fx = Fixture::new(30_000);
        let outbox = RecordingOutbox::new();

        let code = fx.service.create_room(outbox.clone(), "CODE", 2, 25).await;
        assert_eq!(code.as_deref(), Some("CODE"));

        let types = outbox.message_types();
        assert_eq!(types, vec!["init", "room_update"]);

        let init = outbox.last_of_type("init").unwrap();
        assert_eq!(init["playerId"], 0);

        let update = outbox.last_of_type("room_update").unwrap();
        assert_eq!(update["joined"], 1);
        assert_eq!(update["needed"], 2);
    }

    #[tokio::test]
    async fn test_create_room_rejects_short_code() {
        let fx = Fixture::new(30_000);
        let outbox = RecordingOutbox::new();

        let code = fx.service.create_room(outbox.clone(), "AB", 2, 10).await;
        assert!(code.is_none());
        assert_eq!(
            outbox.last_of_type("join_error").unwrap()["message"],
            "Invalid room code."
        );
        assert!(fx.registry.get_room("AB").await.is_none());
    }

    #[tokio::test]
    async fn test_create_room_rejects_other_seat_counts() {
        let fx = Fixture::new(30_000);
        let outbox = RecordingOutbox::new();

        let code = fx.service.create_room(outbox.clone(), "CODE", 4, 10).await;
        assert!(code.is_none());
        assert!(outbox.last_of_type("join_error").is_some());
    }

    #[tokio::test]
    async fn test_create_room_rejects_duplicate_code() {
        let fx = Fixture::new(30_000);
        let first = RecordingOutbox::new();
        let second = RecordingOutbox::new();

        fx.service.create_room(first, "CODE", 2, 10).await.unwrap();
        let result = fx.service.create_room(second.clone(), "CODE", 2, 10).await;

        assert!(result.is_none());
        assert_eq!(
            second.last_of_type("join_error").unwrap()["message"],
            "Code already exists. Try again."
        );
    }

    #[tokio::test]
    async fn test_join_room_assigns_next_seat() {
        let fx = Fixture::new(30_000);
        let (host, guest) = fx.seated_room().await;

        assert_eq!(guest.last_of_type("init").unwrap()["playerId"], 1);
        assert!(guest.last_of_type("join_ok").is_some());

        // Both see the updated occupancy.
        assert_eq!(host.last_of_type("room_update").unwrap()["joined"], 2);
        assert_eq!(guest.last_of_type("room_update").unwrap()["joined"], 2);
    }

    #[tokio::test]
    async fn test_join_missing_room() {
        let fx = Fixture::new(30_000);
        let outbox = RecordingOutbox::new();

        assert!(fx.service.join_room(outbox.clone(), "NOPE").await.is_none());
        assert_eq!(
            outbox.last_of_type("join_error").unwrap()["message"],
            "Room not found."
        );
    }

    #[tokio::test]
    async fn test_join_full_room() {
        let fx = Fixture::new(30_000);
        let _seats = fx.seated_room().await;
        let third = RecordingOutbox::new();

        assert!(fx.service.join_room(third.clone(), "CODE").await.is_none());
        assert_eq!(
            third.last_of_type("join_error").unwrap()["message"],
            "Room is full."
        );
    }

    #[tokio::test]
    async fn test_start_game_deals_and_broadcasts() {
        let fx = Fixture::new(30_000);
        let (host, guest) = fx.seated_room().await;

        let host_outbox: Arc<dyn SeatOutbox> = host.clone();
        fx.service.start_game("CODE", &host_outbox).await;

        for outbox in [&host, &guest] {
            assert!(outbox.last_of_type("game_start").is_some());
            let state = outbox.last_of_type("state").unwrap();
            assert_eq!(state["yourHand"].as_array().unwrap().len(), 10);
            assert_eq!(state["deckCount"], 31);
            assert_eq!(state["oppHandCount"], 10);
            assert_eq!(state["roundId"], 1);
            assert!(state["turnEndsAt"].is_i64());
        }

        // Exactly one seat holds the turn.
        let host_turn = host.last_of_type("state").unwrap()["yourTurn"]
            .as_bool()
            .unwrap();
        let guest_turn = guest.last_of_type("state").unwrap()["yourTurn"]
            .as_bool()
            .unwrap();
        assert!(host_turn ^ guest_turn);
    }

    #[tokio::test]
    async fn test_start_game_requires_host_seat() {
        let fx = Fixture::new(30_000);
        let (host, guest) = fx.seated_room().await;
        host.clear();
        guest.clear();

        let guest_outbox: Arc<dyn SeatOutbox> = guest.clone();
        fx.service.start_game("CODE", &guest_outbox).await;

        assert!(host.raw_messages().is_empty());
        assert!(guest.raw_messages().is_empty());
    }

    #[tokio::test]
    async fn test_start_game_requires_full_room() {
        let fx = Fixture::new(30_000);
        let host = RecordingOutbox::new();
        fx.service
            .create_room(host.clone(), "CODE", 2, 10)
            .await
            .unwrap();

        let host_outbox: Arc<dyn SeatOutbox> = host.clone();
        fx.service.start_game("CODE", &host_outbox).await;

        assert_eq!(
            host.last_of_type("join_error").unwrap()["message"],
            "Need more players to start."
        );
        let room_ref = fx.registry.get_room("CODE").await.unwrap();
        assert!(room_ref.lock().await.game.is_none());
    }

    #[tokio::test]
    async fn test_draw_and_discard_through_service() {
        let fx = Fixture::new(30_000);
        let (host, guest) = fx.started_room().await;

        let seat = fx.current_player().await;
        let actor = fx.seat_outbox(seat, &host, &guest).await;

        fx.act(&actor, Action::DrawDeck).await;
        let state = actor.last_of_type("state").unwrap();
        assert_eq!(state["yourHand"].as_array().unwrap().len(), 11);
        assert_eq!(state["phase"], "discard");

        let card_id = state["yourHand"][0]["rank"].as_str().unwrap().to_string()
            + state["yourHand"][0]["suit"].as_str().unwrap();
        fx.act(&actor, Action::Discard { card_id }).await;

        let state = actor.last_of_type("state").unwrap();
        assert_eq!(state["yourHand"].as_array().unwrap().len(), 10);
        assert_eq!(state["phase"], "draw");
        assert_eq!(state["yourTurn"], false);

        assert_eq!(fx.current_player().await, game::opponent(seat));
    }

    #[tokio::test]
    async fn test_stale_action_from_wrong_seat_is_silent() {
        let fx = Fixture::new(30_000);
        let (host, guest) = fx.started_room().await;

        let waiting_seat = game::opponent(fx.current_player().await);
        let waiter = fx.seat_outbox(waiting_seat, &host, &guest).await;

        fx.act(&waiter, Action::DrawDiscard).await;

        // No broadcast at all: the action was ignored.
        assert!(waiter.last_of_type("state").is_none());
        assert!(host.last_of_type("state").is_none());
        assert!(guest.last_of_type("state").is_none());
    }

    #[tokio::test]
    async fn test_turn_timeout_forces_discard_and_advances() {
        let fx = Fixture::new(60);
        let (host, guest) = fx.started_room().await;

        let seat = fx.current_player().await;
        let actor = fx.seat_outbox(seat, &host, &guest).await;
        let other = fx.seat_outbox(game::opponent(seat), &host, &guest).await;

        fx.act(&actor, Action::DrawDeck).await;
        // Past the first expiry but before the opponent's timer can fire too.
        tokio::time::sleep(Duration::from_millis(90)).await;

        // The timed-out seat saw the discarded card id; the opponent did not.
        let own_notice = actor.last_of_type("timeout_discard").unwrap();
        assert_eq!(own_notice["playerId"], seat);
        assert!(own_notice["cardId"].is_string());

        let other_notice = other.last_of_type("timeout_discard").unwrap();
        assert!(other_notice.get("cardId").is_none());

        assert_eq!(fx.current_player().await, game::opponent(seat));
        let state = actor.last_of_type("state").unwrap();
        assert_eq!(state["yourHand"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_turn_timeout_without_draw_passes() {
        let fx = Fixture::new(60);
        let (host, guest) = fx.started_room().await;
        let seat = fx.current_player().await;

        tokio::time::sleep(Duration::from_millis(90)).await;

        let notice = host.last_of_type("timeout_pass").unwrap();
        assert_eq!(notice["playerId"], seat);
        assert!(guest.last_of_type("timeout_pass").is_some());

        assert_eq!(fx.current_player().await, game::opponent(seat));
    }

    #[tokio::test]
    async fn test_manual_discard_supersedes_timer() {
        let fx = Fixture::new(80);
        let (host, guest) = fx.started_room().await;

        let seat = fx.current_player().await;
        let actor = fx.seat_outbox(seat, &host, &guest).await;

        fx.act(&actor, Action::DrawDeck).await;
        let state = actor.last_of_type("state").unwrap();
        let card_id = state["yourHand"][0]["rank"].as_str().unwrap().to_string()
            + state["yourHand"][0]["suit"].as_str().unwrap();
        fx.act(&actor, Action::Discard { card_id }).await;

        // Wait past the original deadline; only the opponent's fresh timer
        // exists now, so no timeout notice may reference the first seat.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(actor.last_of_type("timeout_discard").is_none());
        assert!(actor.last_of_type("timeout_pass").is_none());
    }

    #[tokio::test]
    async fn test_disconnect_with_remaining_player() {
        let fx = Fixture::new(30_000);
        let (host, guest) = fx.started_room().await;

        let guest_outbox: Arc<dyn SeatOutbox> = guest.clone();
        fx.service.handle_disconnect("CODE", &guest_outbox).await;

        // The survivor is re-inited as seat 0 and told the game ended.
        assert_eq!(host.last_of_type("init").unwrap()["playerId"], 0);
        assert_eq!(host.last_of_type("room_update").unwrap()["joined"], 1);
        assert_eq!(
            host.last_of_type("join_error").unwrap()["message"],
            "Player disconnected. Game ended."
        );

        let room_ref = fx.registry.get_room("CODE").await.unwrap();
        let room = room_ref.lock().await;
        assert!(room.game.is_none());
        assert!(!room.timer.is_armed());
    }

    #[tokio::test]
    async fn test_disconnect_of_last_player_deletes_room() {
        let fx = Fixture::new(30_000);
        let (host, guest) = fx.seated_room().await;

        let guest_outbox: Arc<dyn SeatOutbox> = guest.clone();
        fx.service.handle_disconnect("CODE", &guest_outbox).await;
        let host_outbox: Arc<dyn SeatOutbox> = host.clone();
        fx.service.handle_disconnect("CODE", &host_outbox).await;

        assert!(fx.registry.get_room("CODE").await.is_none());
    }

    #[tokio::test]
    async fn test_rematch_votes_reach_snapshots() {
        let fx = Fixture::new(30_000);
        let (host, guest) = fx.started_room().await;

        fx.act(&host, Action::Rematch).await;
        let state = host.last_of_type("state").unwrap();
        assert_eq!(state["rematchVotes"], serde_json::json!([true, false]));
        assert!(state["rematchCountdownEndsAt"].is_null());

        fx.act(&guest, Action::Rematch).await;
        let state = guest.last_of_type("state").unwrap();
        assert_eq!(state["rematchVotes"], serde_json::json!([true, true]));
        assert!(state["rematchCountdownEndsAt"].is_i64());
    }
}
