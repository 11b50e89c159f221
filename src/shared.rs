use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::room::RoomService;

/// Shared application state handed to every HTTP/WebSocket handler.
#[derive(Clone)]
pub struct AppState {
    pub room_service: Arc<RoomService>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(room_service: Arc<RoomService>, config: Arc<ServerConfig>) -> Self {
        Self {
            room_service,
            config,
        }
    }
}

/// Structural failures on the HTTP surface. Gameplay never produces these —
/// invalid game actions are silently ignored and room-level problems go out
/// as `join_error` messages on the open socket.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Room already exists: {0}")]
    RoomExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::RoomExists(code) => {
                (StatusCode::CONFLICT, format!("Room already exists: {}", code))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
