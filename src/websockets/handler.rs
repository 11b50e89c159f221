use axum::{
    extract::{State, WebSocketUpgrade},
    http::{header, HeaderMap},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::room::SeatOutbox;
use crate::shared::{AppError, AppState};

use super::socket::Connection;

/// WebSocket endpoint. Browsers must present an allow-listed Origin header;
/// clients without one (tooling, tests) are let through. Room membership is
/// established later via `create_room`/`join_room` messages, not the URL.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    if !app_state.config.is_origin_allowed(origin.as_deref()) {
        warn!(origin = ?origin, "Rejected WebSocket origin");
        return Err(AppError::Unauthorized("Origin not allowed".to_string()));
    }

    info!(origin = ?origin, "WebSocket connection requested");
    Ok(ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state)))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let conn_id = Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, "WebSocket connection established");

    // Outbound channel (room broadcasts -> this client); the sender is the
    // seat capability handed to the room service.
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    let outbox: Arc<dyn SeatOutbox> = Arc::new(outbound_sender);

    let connection = Connection::new(
        conn_id.clone(),
        Box::new(socket),
        outbound_receiver,
        outbox,
        app_state.room_service.clone(),
    );

    match connection.run().await {
        Ok(()) => {
            info!(conn_id = %conn_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(conn_id = %conn_id, error = ?e, "WebSocket connection error");
        }
    }
}
