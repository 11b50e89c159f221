use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::game::Action;
use crate::room::{RoomService, SeatOutbox};
use crate::websockets::messages::ClientMessage;

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

#[derive(Debug)]
pub enum SocketError {
    SendFailed(String),
    ReceiveFailed(String),
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        match self.next().await {
            Some(Ok(Message::Text(text))) => Ok(Some(text)),
            Some(Ok(Message::Close(_))) => Ok(None),
            Some(Ok(_)) => Ok(None), // Ignore binary/ping/pong
            Some(Err(e)) => Err(SocketError::ReceiveFailed(e.to_string())),
            None => Ok(None), // Connection closed
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Room codes are case-normalized before they touch the registry, so `abcd`
/// and ` ABCD ` address the same room.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Maps a parsed game-action message to an engine action. Returns None for
/// payloads with nothing actionable (no card id, no order array); those are
/// dropped the same way a malformed message is.
fn action_from_message(message: ClientMessage) -> Option<Action> {
    match message {
        ClientMessage::DrawDeck => Some(Action::DrawDeck),
        ClientMessage::DrawDiscard => Some(Action::DrawDiscard),
        ClientMessage::Discard { card_id, card } => {
            let card_id = card_id.or_else(|| card.map(|c| c.id()))?;
            Some(Action::Discard { card_id })
        }
        ClientMessage::Gin => Some(Action::Gin),
        ClientMessage::Rematch => Some(Action::Rematch),
        ClientMessage::HandOrder { order } => order.map(|order| Action::HandOrder { order }),
        ClientMessage::CreateRoom { .. }
        | ClientMessage::JoinRoom { .. }
        | ClientMessage::StartGame { .. } => None,
    }
}

/// One managed client connection. A connection starts roomless; it acquires
/// a room and a seat through `create_room`/`join_room` messages and routes
/// everything after that into the room service. When the socket ends, the
/// connection unseats itself.
pub struct Connection {
    conn_id: String,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    outbox: Arc<dyn SeatOutbox>,
    service: Arc<RoomService>,
    room_code: Option<String>,
}

impl Connection {
    pub fn new(
        conn_id: String,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        outbox: Arc<dyn SeatOutbox>,
        service: Arc<RoomService>,
    ) -> Self {
        Self {
            conn_id,
            socket,
            outbound_receiver,
            outbox,
            service,
            room_code: None,
        }
    }

    /// Run the connection - pumps both directions until disconnect, then
    /// removes this connection's seat from its room.
    pub async fn run(mut self) -> Result<(), SocketError> {
        let result = loop {
            tokio::select! {
                // Outbound messages (room broadcasts -> client)
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => {
                            if let Err(e) = self.socket.send_message(message).await {
                                break Err(e);
                            }
                        }
                        None => break Ok(()), // Channel closed, disconnect
                    }
                }

                // Inbound messages (client -> room service)
                msg = self.socket.receive_message() => {
                    match msg {
                        Ok(Some(message)) => self.handle_incoming(message).await,
                        Ok(None) => break Ok(()), // Client disconnected
                        Err(e) => break Err(e),
                    }
                }
            }
        };

        if let Some(code) = self.room_code.take() {
            self.service.handle_disconnect(&code, &self.outbox).await;
        }

        let _ = self.socket.close().await;
        result
    }

    async fn handle_incoming(&mut self, raw: String) {
        let message = match serde_json::from_str::<ClientMessage>(&raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    conn_id = %self.conn_id,
                    error = %e,
                    "Dropping unparseable message"
                );
                return;
            }
        };

        match message {
            ClientMessage::CreateRoom {
                code,
                players_needed,
                points_target,
            } => {
                let code = normalize_code(code.as_deref().unwrap_or(""));
                let players_needed = players_needed.unwrap_or(2);
                let target_score = points_target.unwrap_or(10);

                if let Some(joined) = self
                    .service
                    .create_room(self.outbox.clone(), &code, players_needed, target_score)
                    .await
                {
                    info!(conn_id = %self.conn_id, room_code = %joined, "connection created room");
                    self.room_code = Some(joined);
                }
            }

            ClientMessage::JoinRoom { code } => {
                let code = normalize_code(code.as_deref().unwrap_or(""));
                if let Some(joined) = self.service.join_room(self.outbox.clone(), &code).await {
                    info!(conn_id = %self.conn_id, room_code = %joined, "connection joined room");
                    self.room_code = Some(joined);
                }
            }

            ClientMessage::StartGame { code } => {
                let code = normalize_code(code.as_deref().unwrap_or(""));
                // Only the room this connection is actually seated in.
                if self.room_code.as_deref() == Some(code.as_str()) {
                    self.service.start_game(&code, &self.outbox).await;
                }
            }

            other => {
                let code = match self.room_code.as_ref() {
                    Some(code) => code.clone(),
                    None => {
                        debug!(conn_id = %self.conn_id, "game action before joining a room");
                        return;
                    }
                };
                if let Some(action) = action_from_message(other) {
                    self.service.handle_action(&code, &self.outbox, action).await;
                }
            }
        }
    }
}
